//! Architectural register storage.
//!
//! `RegisterFile` is the single owner of every register. It only knows how
//! to store and retrieve bits; pipeline side effects (COMM handshake, stop
//! and reset requests, the same-clock write log) live in the machine's
//! commit path, which calls [`RegisterFile::write`] after bookkeeping.

use crate::common::constants::{
    NUM_ADDR_REGS, NUM_FPR, NUM_GPR, NUM_IREG, NUM_SECTIONS, RIND_MASK,
};
use crate::common::{CtrlReg, Half, RegId, RegKind, RegVal, SimError, SimResult};

use super::status::STATUS_FE;

/// Per-section register state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionRegs {
    /// Floating-point register pairs.
    pub fpr: [u64; NUM_FPR],
    /// Condition codes; bit 0 is always set after a write.
    pub fccr: u64,
    /// Exception flags and cause.
    pub fcsr: u64,
}

impl Default for SectionRegs {
    fn default() -> Self {
        Self {
            fpr: [0; NUM_FPR],
            fccr: 1,
            fcsr: 0,
        }
    }
}

/// All architectural registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterFile {
    /// General-purpose registers.
    pub gpr: [u64; NUM_GPR],
    /// Index registers.
    pub ireg: [u64; NUM_IREG],
    /// Address registers.
    pub an: [u64; NUM_ADDR_REGS],
    /// Address step registers.
    pub nn: [u64; NUM_ADDR_REGS],
    /// Address mode registers.
    pub mn: [u64; NUM_ADDR_REGS],
    /// Per-section registers.
    pub sections: [SectionRegs; NUM_SECTIONS],
    ctrl: [u64; 12],
    clockcount: u64,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file holding the reset image.
    pub fn new() -> Self {
        let mut regs = Self {
            gpr: [0; NUM_GPR],
            ireg: [0; NUM_IREG],
            an: [0; NUM_ADDR_REGS],
            nn: [1; NUM_ADDR_REGS],
            mn: [0x1fff; NUM_ADDR_REGS],
            sections: Default::default(),
            ctrl: [0; 12],
            clockcount: 0,
        };
        regs.ctrl[CtrlReg::Status as usize] = STATUS_FE;
        regs
    }

    /// Restores the reset image, keeping the clock counter.
    pub fn reset(&mut self) {
        let clockcount = self.clockcount;
        *self = Self::new();
        self.clockcount = clockcount;
    }

    /// Reads a control register.
    pub const fn ctrl(&self, reg: CtrlReg) -> u64 {
        match reg {
            CtrlReg::ClockCount => self.clockcount,
            _ => self.ctrl[reg as usize],
        }
    }

    /// Current STATUS value.
    pub const fn status(&self) -> u64 {
        self.ctrl[CtrlReg::Status as usize]
    }

    /// Current CONTROL value.
    pub const fn control(&self) -> u64 {
        self.ctrl[CtrlReg::Control as usize]
    }

    /// Current PC register value.
    pub const fn pc(&self) -> u32 {
        self.ctrl[CtrlReg::Pc as usize] as u32
    }

    /// Advances the free-running clock counter.
    pub const fn tick(&mut self) {
        self.clockcount = self.clockcount.wrapping_add(1);
    }

    /// Reads the committed value of a register.
    ///
    /// FPR reads always return the whole pair regardless of `id.half`.
    ///
    /// # Arguments
    ///
    /// * `id` - Register to read.
    ///
    /// # Returns
    ///
    /// The stored bits, or `InvalidRegister` if `id` names no storage.
    pub fn read(&self, id: RegId) -> SimResult<u64> {
        let i = id.index as usize;
        let bad = || SimError::InvalidRegister(id);
        let value = match id.kind {
            RegKind::Gpr => *self.gpr.get(i).ok_or_else(bad)?,
            RegKind::Ireg => *self.ireg.get(i).ok_or_else(bad)?,
            RegKind::AddrAn => *self.an.get(i).ok_or_else(bad)?,
            RegKind::AddrNn => *self.nn.get(i).ok_or_else(bad)?,
            RegKind::AddrMn => *self.mn.get(i).ok_or_else(bad)?,
            RegKind::Fpr => *self.section(id)?.fpr.get(i).ok_or_else(bad)?,
            RegKind::Fccr => self.section(id)?.fccr,
            RegKind::Fcsr => self.section(id)?.fcsr,
            RegKind::Ctrl => self.ctrl(CtrlReg::from_index(id.index).ok_or_else(bad)?),
        };
        Ok(value)
    }

    /// Stores a masked value.
    ///
    /// FPR half writes replace only the selected 32-bit lane; the value is
    /// taken from the same lane of `val.bits`.
    pub fn write(&mut self, id: RegId, val: RegVal) -> SimResult<()> {
        let i = id.index as usize;
        let bad = || SimError::InvalidRegister(id);
        let slot = match id.kind {
            RegKind::Gpr => self.gpr.get_mut(i).ok_or_else(bad)?,
            RegKind::Ireg => self.ireg.get_mut(i).ok_or_else(bad)?,
            RegKind::AddrAn => self.an.get_mut(i).ok_or_else(bad)?,
            RegKind::AddrNn => self.nn.get_mut(i).ok_or_else(bad)?,
            RegKind::AddrMn => self.mn.get_mut(i).ok_or_else(bad)?,
            RegKind::Fpr => {
                let lane = match id.half {
                    Half::Both => u64::MAX,
                    Half::Hi => 0xffff_ffff_0000_0000,
                    Half::Lo => 0x0000_0000_ffff_ffff,
                };
                let slot = self.section_mut(id)?.fpr.get_mut(i).ok_or_else(bad)?;
                *slot = RegVal::masked(val.bits, val.mask & lane).apply(*slot);
                return Ok(());
            }
            RegKind::Fccr => {
                let s = self.section_mut(id)?;
                s.fccr = val.apply(s.fccr) | 1;
                return Ok(());
            }
            RegKind::Fcsr => &mut self.section_mut(id)?.fcsr,
            RegKind::Ctrl => {
                let reg = CtrlReg::from_index(id.index).ok_or_else(bad)?;
                let width = match reg {
                    CtrlReg::Comm | CtrlReg::StopCode | CtrlReg::ClockCount => u64::MAX,
                    CtrlReg::Rind | CtrlReg::Rstep | CtrlReg::Rmask => RIND_MASK,
                    _ => 0xffff_ffff,
                };
                let slot = match reg {
                    CtrlReg::ClockCount => &mut self.clockcount,
                    _ => &mut self.ctrl[reg as usize],
                };
                *slot = RegVal::masked(val.bits, val.mask & width).apply(*slot);
                return Ok(());
            }
        };
        *slot = val.apply(*slot);
        Ok(())
    }

    fn section(&self, id: RegId) -> SimResult<&SectionRegs> {
        id.section
            .and_then(|s| self.sections.get(s as usize))
            .ok_or(SimError::InvalidRegister(id))
    }

    fn section_mut(&mut self, id: RegId) -> SimResult<&mut SectionRegs> {
        id.section
            .and_then(|s| self.sections.get_mut(s as usize))
            .ok_or(SimError::InvalidRegister(id))
    }
}
