//! Host-facing register, FIFO and memory access.
//!
//! The host CPU talks to the coprocessor through a handful of registers
//! and bulk memory windows:
//! 1. **Registers:** COMM, CONTROL and STATUS are writable; CLOCKCOUNT and STOPCODE are read-only.
//! 2. **Instruction FIFO:** Four words deep; pushes into a full FIFO are dropped.
//! 3. **Memories:** IRAM and the four local memory banks, range checked.
//! 4. **DMA:** `CHECK_DMA` polls a host-provided [`DmaController`]; `START_DMA` raises a flag.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::constants::{IRAM_WORDS, NUM_IREG};
use crate::common::{CtrlReg, Origin, RegId, RegVal, SimError, SimResult};
use crate::isa::Instruction;

use super::{FifoEntry, Machine};

/// Registers reachable from the host, numbered as on the host bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum HostReg {
    /// Instruction FIFO (write only).
    Fifo = 0,
    /// Mailbox register.
    Comm = 1,
    /// Reset, stop, rounding mode and twiddle sign control.
    Control = 2,
    /// Run, FIFO, mailbox and sticky flags.
    Status = 3,
    /// Code of the last `STOP` (read only).
    StopCode = 5,
    /// Clock counter (read only).
    ClockCount = 100,
}

impl HostReg {
    /// Looks up a host register by bus number.
    pub const fn from_index(index: u32) -> SimResult<Self> {
        match index {
            0 => Ok(Self::Fifo),
            1 => Ok(Self::Comm),
            2 => Ok(Self::Control),
            3 => Ok(Self::Status),
            5 => Ok(Self::StopCode),
            100 => Ok(Self::ClockCount),
            _ => Err(SimError::InvalidHostRegister(index)),
        }
    }

    const fn ctrl(self) -> Option<CtrlReg> {
        match self {
            Self::Fifo => None,
            Self::Comm => Some(CtrlReg::Comm),
            Self::Control => Some(CtrlReg::Control),
            Self::Status => Some(CtrlReg::Status),
            Self::StopCode => Some(CtrlReg::StopCode),
            Self::ClockCount => Some(CtrlReg::ClockCount),
        }
    }
}

/// Host-side DMA engine queried by `CHECK_DMA`.
pub trait DmaController {
    /// Returns the DMA status word written to the destination GPR.
    fn check_dma(&mut self) -> u64;
}

impl Machine {
    /// Resets the coprocessor as the host reset line does.
    ///
    /// Registers take their reset image; pipelines, queue, FIFO and stacks
    /// are emptied. IRAM, local memory and the clock counter are kept.
    pub fn reset(&mut self) {
        self.reset_state();
        debug!("host reset");
    }

    /// Writes a host register.
    ///
    /// # Arguments
    ///
    /// * `reg` - Target register.
    /// * `value` - Data, or the instruction word for [`HostReg::Fifo`].
    /// * `mask` - Bits of `value` that take effect (ignored for the FIFO).
    /// * `ldc2` - FIFO words only: pre-load into IRAM instead of executing.
    ///
    /// # Returns
    ///
    /// `InvalidHostRegister` for the read-only registers.
    pub fn reg_write(&mut self, reg: HostReg, value: u64, mask: u64, ldc2: bool) -> SimResult<()> {
        match reg {
            HostReg::Fifo => {
                self.fifo_push(Instruction(value), ldc2);
                Ok(())
            }
            HostReg::Comm | HostReg::Control | HostReg::Status => {
                let id = RegId::ctrl(reg.ctrl().ok_or(SimError::InvalidHostRegister(reg as u32))?);
                self.commit(id, RegVal::masked(value, mask).from_origin(Origin::Host))
            }
            HostReg::StopCode | HostReg::ClockCount => Err(SimError::InvalidHostRegister(reg as u32)),
        }
    }

    /// Reads a host register.
    ///
    /// Reading COMM acknowledges the coprocessor's message.
    pub fn reg_read(&mut self, reg: HostReg) -> SimResult<u64> {
        let ctrl = reg.ctrl().ok_or(SimError::InvalidHostRegister(reg as u32))?;
        let id = RegId::ctrl(ctrl);
        let value = self.read_raw(id)?;
        self.comm_read_handshake(id, Origin::Host)?;
        Ok(value)
    }

    fn fifo_push(&mut self, instr: Instruction, ldc2: bool) {
        match self.fifo.push(FifoEntry { instr, ldc2 }) {
            Ok(()) => debug!(word = format_args!("{:#018x}", instr.0), ldc2, depth = self.fifo.len(), "fifo push"),
            Err(dropped) => warn!(word = format_args!("{:#018x}", dropped.instr.0), "write into full fifo dropped"),
        }
    }

    /// Returns true if the instruction FIFO cannot take another word.
    pub const fn fifo_full(&self) -> bool {
        self.fifo.is_full()
    }

    /// Evaluates a host branch condition.
    ///
    /// Only condition code 0 (FIFO full) exists.
    pub const fn condcode(&self, cc: u32) -> SimResult<bool> {
        match cc {
            0 => Ok(self.fifo_full()),
            _ => Err(SimError::InvalidCondCode(cc)),
        }
    }

    /// Returns true while clocking the machine can still change its state
    /// without host action.
    pub const fn pending_work(&self) -> bool {
        self.sync.pending || self.stop.pending || (!self.run_flag && !self.fifo.is_empty())
    }

    /// Copies local memory words of one section into `buf`.
    pub fn lmem_read(&self, section: usize, addr: usize, buf: &mut [u64]) -> SimResult<()> {
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.lmem_word(section, addr + i)?;
        }
        Ok(())
    }

    /// Copies `data` into local memory of one section starting at `addr`.
    pub fn lmem_write(&mut self, section: usize, addr: usize, data: &[u64]) -> SimResult<()> {
        for (i, word) in data.iter().enumerate() {
            self.set_lmem_word(section, addr + i, *word)?;
        }
        Ok(())
    }

    /// Copies IRAM words starting at `addr` into `buf`.
    pub fn iram_read(&self, addr: usize, buf: &mut [u64]) -> SimResult<()> {
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.iram_word(addr + i)?;
        }
        Ok(())
    }

    /// Writes a program at the committed PC and moves PC past it.
    pub fn iram_write(&mut self, program: &[u64]) -> SimResult<()> {
        let start = self.regs.pc() as usize;
        let end = start + program.len();
        if end > IRAM_WORDS {
            return Err(SimError::IramOutOfRange { addr: end - 1 });
        }
        self.iram[start..end].copy_from_slice(program);
        self.regs.write(RegId::ctrl(CtrlReg::Pc), RegVal::new(end as u64))?;
        self.flow.newpc = end as u32;
        debug!(start, words = program.len(), "iram write");
        Ok(())
    }

    /// Reads integer register IR`n`.
    pub fn ireg_read(&self, n: usize) -> SimResult<u64> {
        if n >= NUM_IREG {
            return Err(SimError::InvalidRegister(RegId::ireg(n)));
        }
        self.read_raw(RegId::ireg(n))
    }

    /// Installs the DMA engine polled by `CHECK_DMA`.
    pub fn set_dma_controller(&mut self, dma: Box<dyn DmaController>) {
        self.dma = Some(dma);
    }

    /// Collects the `START_DMA` request, clearing it.
    pub const fn take_start_dma(&mut self) -> bool {
        std::mem::replace(&mut self.start_dma, false)
    }

    /// Code of the last executed `STOP`/`STOPI`.
    pub const fn stop_code(&self) -> u64 {
        self.regs.ctrl(CtrlReg::StopCode)
    }
}
