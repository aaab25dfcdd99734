//! Stage-1 Execution Handlers.
//!
//! This module implements what every opcode does once its pipeline entry
//! reaches stage 1, plus the lo operations that act at issue. It provides:
//! 1. **Section Driver:** Runs a hi operation in each of the four sections with predication,
//!    collects the planned writes and updates FCSR and STATUS.fpe.
//! 2. **Hi Handlers:** Complex, packed-single, matrix, integer/permute, elementary,
//!    condition and twiddle operations.
//! 3. **Lo Handlers:** Register transfers, loops, calls, jumps, DMA queries and lane permutes.
//! 4. **Memory Stages:** Address generation, local memory access and address write-back.
//!
//! Hi handlers never touch the machine directly. They read committed
//! registers through [`Lanes`] and return their results as planned writes,
//! which the driver schedules after every section has run.

/// Complex arithmetic.
pub mod complex;

/// `C.COND`, `MFC` and `MTC`.
pub mod condition;

/// Run, stop, sync and the other issue-time lo operations.
pub mod control;

/// Elementary functions and range reduction.
pub mod elementary;

/// Packed-word integer, logic and lane reorganization operations.
pub mod integer;

/// Matrix-vector and dot-product operations.
pub mod matrix;

/// Local memory pipe stages.
pub mod memory;

/// Packed-single arithmetic and conversions.
pub mod packed;

/// Register transfers and control flow in the lmem pipe.
pub mod transfer;

/// Twiddle generation and the FFT butterfly.
pub mod twiddle;

use crate::common::constants::{FCSR_MASK, NUM_FPR, NUM_SECTIONS, delay};
use crate::common::{CtrlReg, Half, RegId, RegVal, SimResult};
use crate::core::arch::RegisterFile;
use crate::core::arch::status::{FCSR_CAUSE, STATUS_FPE};
use crate::core::machine::Machine;
use crate::core::units::fpu::Fpu;
use crate::core::units::fpu::exception_flags::FpFlags;
use crate::core::units::fpu::library::FloatLibrary;
use crate::core::units::fpu::rounding_modes::RoundingMode;
use crate::isa::{HiOp, Instruction};

/// Stage-1 body of a hi operation for one section.
pub type HiHandler = fn(&mut Lanes<'_>, Instruction) -> SimResult<()>;

/// High 32-bit lane of a register value.
pub const fn hi(v: u64) -> u32 {
    (v >> 32) as u32
}

/// Low 32-bit lane of a register value.
pub const fn lo(v: u64) -> u32 {
    v as u32
}

/// Joins two 32-bit lanes into a register value.
pub const fn pack(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

/// A register write produced by a handler, scheduled by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedWrite {
    /// Destination register.
    pub id: RegId,
    /// Payload.
    pub val: RegVal,
    /// Clocks until commit.
    pub delay: usize,
    /// Visible to bypass reads.
    pub bypass: bool,
}

/// One section's view of the machine while a hi operation executes.
#[derive(Debug)]
pub struct Lanes<'a> {
    section: usize,
    regs: &'a RegisterFile,
    control: u64,
    /// Floating-point context with this section's accumulated flags.
    pub fpu: Fpu<'a>,
    writes: Vec<PlannedWrite>,
    status_fpe: u64,
}

impl<'a> Lanes<'a> {
    /// Creates the view of `section`.
    pub fn new(section: usize, regs: &'a RegisterFile, lib: &'a dyn FloatLibrary) -> Self {
        let control = regs.control();
        Self {
            section,
            regs,
            control,
            fpu: Fpu::new(lib, RoundingMode::from_control(control)),
            writes: Vec::new(),
            status_fpe: 0,
        }
    }

    /// Section number.
    pub const fn section(&self) -> usize {
        self.section
    }

    /// Committed CONTROL value.
    pub const fn control(&self) -> u64 {
        self.control
    }

    /// Committed FPR `n`; numbers wrap within the bank.
    pub fn raw(&self, n: usize) -> u64 {
        self.regs.sections[self.section].fpr[n % NUM_FPR]
    }

    /// Committed FPR `n` after operand screening.
    pub fn operand(&mut self, n: usize) -> u64 {
        let v = self.raw(n);
        self.fpu.operand(v)
    }

    /// Committed FCCR.
    pub fn fccr(&self) -> u64 {
        self.regs.sections[self.section].fccr
    }

    /// Committed FCSR.
    pub fn fcsr(&self) -> u64 {
        self.regs.sections[self.section].fcsr
    }

    /// Plans an arbitrary write.
    pub fn write(&mut self, id: RegId, val: RegVal, delay: usize, bypass: bool) {
        self.writes.push(PlannedWrite { id, val, delay, bypass });
    }

    /// Plans a whole FPR result write.
    pub fn write_fpr(&mut self, n: usize, bits: u64) {
        let id = RegId::fpr(self.section, n % NUM_FPR);
        self.write(id, RegVal::new(bits), delay::FPU, false);
    }

    /// Plans a result write to one lane of an FPR.
    pub fn write_half(&mut self, n: usize, half: Half, bits: u32) {
        let id = RegId::fpr_half(self.section, n % NUM_FPR, half);
        let bits = match half {
            Half::Hi => pack(bits, 0),
            Half::Lo | Half::Both => u64::from(bits),
        };
        self.write(id, RegVal::new(bits), delay::FPU, false);
    }

    /// Adds STATUS.fpe bits to be written after all sections ran.
    pub const fn accumulate_status_fpe(&mut self, bits: u64) {
        self.status_fpe |= bits;
    }
}

/// Returns true if section `s` is disabled by the predication condition.
fn predicated_off(regs: &RegisterFile, s: usize, cc: u32) -> bool {
    cc != 0 && regs.sections[s].fccr & (1 << cc) == 0
}

/// Stage-1 handler of every hi operation run by the generic section driver.
const fn section_handler(op: HiOp) -> HiHandler {
    match op {
        HiOp::Nop | HiOp::GetCoeff | HiOp::Cfly => nop,
        HiOp::Ccond => condition::ccond,
        HiOp::Mfc => condition::mfc,
        HiOp::Mtc => condition::mtc,
        HiOp::Cadd => complex::cadd,
        HiOp::Csub => complex::csub,
        HiOp::CaddSub => complex::caddsub,
        HiOp::Cneg => complex::cneg,
        HiOp::Cconj => complex::cconj,
        HiOp::Cmul => complex::cmul,
        HiOp::Cmadd => complex::cmadd,
        HiOp::Cmsub => complex::cmsub,
        HiOp::Cmuli => complex::cmuli,
        HiOp::Cmulni => complex::cmulni,
        HiOp::Chmul => complex::chmul,
        HiOp::Chmadd => complex::chmadd,
        HiOp::Chmsub => complex::chmsub,
        HiOp::Cfly2 => complex::cfly2,
        HiOp::PsAdd => packed::psadd,
        HiOp::PsSub => packed::pssub,
        HiOp::PsAddSub => packed::psaddsub,
        HiOp::PsNeg => packed::psneg,
        HiOp::PsMul => packed::psmul,
        HiOp::PsMadd => packed::psmadd,
        HiOp::PsMsub => packed::psmsub,
        HiOp::PsAbs => packed::psabs,
        HiOp::PsCopySign => packed::pscopysign,
        HiOp::PsGetExp => packed::psgetexp,
        HiOp::PsGetMan => packed::psgetman,
        HiOp::PsScale => packed::psscale,
        HiOp::PwToPs => packed::pwtops,
        HiOp::PsToPw => packed::pstopw,
        HiOp::Unpck16WsToPs => packed::unpck16wstops,
        HiOp::MvMul => matrix::mvmul,
        HiOp::MtvMul => matrix::mtvmul,
        HiOp::MvMadd => matrix::mvmadd,
        HiOp::MtvMadd => matrix::mtvmadd,
        HiOp::MvMsub => matrix::mvmsub,
        HiOp::MtvMsub => matrix::mtvmsub,
        HiOp::MTrans => matrix::mtrans,
        HiOp::QsDot => matrix::qsdot,
        HiOp::Clear => integer::clear,
        HiOp::Copy => integer::copy,
        HiOp::SwapHl => integer::swaphl,
        HiOp::Swap64 => integer::swap64,
        HiOp::RdSec => integer::rdsec,
        HiOp::Li0 => integer::li0,
        HiOp::Li1 => integer::li1,
        HiOp::Li2 => integer::li2,
        HiOp::Li3 => integer::li3,
        HiOp::Add => integer::add,
        HiOp::Sub => integer::sub,
        HiOp::Abs => integer::abs,
        HiOp::Neg => integer::neg,
        HiOp::AddI => integer::addi,
        HiOp::SubI => integer::subi,
        HiOp::IncI => integer::inci,
        HiOp::DecI => integer::deci,
        HiOp::And => integer::and,
        HiOp::Or => integer::or,
        HiOp::Xor => integer::xor,
        HiOp::Not => integer::not,
        HiOp::LShift => integer::lshift,
        HiOp::LShiftI => integer::lshifti,
        HiOp::AShift => integer::ashift,
        HiOp::AShiftI => integer::ashifti,
        HiOp::Split8 => integer::split8,
        HiOp::Split16 => integer::split16,
        HiOp::Split32 => integer::split32,
        HiOp::ExtSign8H => integer::extsign8h,
        HiOp::ExtSign8W => integer::extsign8w,
        HiOp::ExtSign16W => integer::extsign16w,
        HiOp::Join8 => integer::join8,
        HiOp::Join16 => integer::join16,
        HiOp::Join32 => integer::join32,
        HiOp::Recip => elementary::recip,
        HiOp::Rsqrt => elementary::rsqrt,
        HiOp::Sinc => elementary::sinc,
        HiOp::Atanc => elementary::atanc,
        HiOp::Log2c => elementary::log2c,
        HiOp::Exp2 => elementary::exp2,
        HiOp::RrCosSin => elementary::rrcossin,
        HiOp::RrSin => elementary::rrsin,
        HiOp::RrCos => elementary::rrcos,
        HiOp::RrLog2 => elementary::rrlog2,
    }
}

#[allow(clippy::unnecessary_wraps)]
fn nop(_: &mut Lanes<'_>, _: Instruction) -> SimResult<()> {
    Ok(())
}

impl Machine {
    /// Runs stage 1 of a hi operation.
    pub(crate) fn execute_hi(&mut self, instr: Instruction, op: HiOp) -> SimResult<()> {
        match op {
            HiOp::Nop => Ok(()),
            HiOp::GetCoeff | HiOp::Cfly => self.execute_twiddle(instr, op),
            HiOp::QsDot => self.for_sections(instr, op, false, |l| matrix::qsdot(l, instr)),
            _ => {
                let body = section_handler(op);
                self.for_sections(instr, op, true, |l| body(l, instr))
            }
        }
    }

    /// Runs `body` in every enabled section, then schedules its results.
    ///
    /// # Arguments
    ///
    /// * `instr` - Instruction word; its `cc` field selects the predication bit.
    /// * `op` - Operation, deciding whether FCSR is updated.
    /// * `predicated` - Whether the `cc` field applies.
    /// * `body` - Per-section computation.
    pub(crate) fn for_sections(
        &mut self,
        instr: Instruction,
        op: HiOp,
        predicated: bool,
        mut body: impl FnMut(&mut Lanes<'_>) -> SimResult<()>,
    ) -> SimResult<()> {
        let mut planned = Vec::new();
        let mut section_flags = Vec::with_capacity(NUM_SECTIONS);
        let mut status_fpe = 0;

        for s in 0..NUM_SECTIONS {
            if predicated && predicated_off(&self.regs, s, instr.cc()) {
                continue;
            }
            let mut lanes = Lanes::new(s, &self.regs, self.lib.as_ref());
            body(&mut lanes)?;
            section_flags.push((s, lanes.fpu.flags()));
            status_fpe |= lanes.status_fpe;
            planned.append(&mut lanes.writes);
        }

        let mut raised = FpFlags::NONE;
        if op.updates_fcsr() {
            for (s, flags) in section_flags {
                self.update_fcsr(s, flags)?;
                raised |= flags;
            }
        }
        for w in planned {
            self.schedule_write(w.id, w.val, w.delay, w.bypass)?;
        }
        if op == HiOp::Mtc {
            self.schedule_write(
                RegId::ctrl(CtrlReg::Status),
                RegVal::masked(status_fpe, STATUS_FPE),
                delay::MTC,
                false,
            )?;
        }
        if !raised.is_empty() {
            self.set_status_bits(raised.status_fpe(), STATUS_FPE)?;
        }
        Ok(())
    }

    /// Replaces FCSR.cause with `flags` and accumulates them into FCSR.flags.
    fn update_fcsr(&mut self, section: usize, flags: FpFlags) -> SimResult<()> {
        let id = RegId::fcsr(section);
        let old = self.bypass_value(id)?;
        let new = (old & !FCSR_CAUSE) | flags.fcsr_cause() | flags.fcsr_flags();
        self.schedule_write(id, RegVal::masked(new, FCSR_MASK), delay::FCSR, true)
    }
}
