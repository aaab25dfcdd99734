//! Side-effect free inspection for debuggers.
//!
//! These reads see the committed register file and the control-flow
//! stacks only. They never consult the forwarding network and never
//! trigger the COMM handshake.

use serde::{Deserialize, Serialize};

use crate::common::{CtrlReg, RegId, SimError, SimResult};

use super::Machine;

/// FPU control register selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FpuCtrlReg {
    /// Condition codes.
    Fccr,
    /// Exception flags and cause.
    Fcsr,
}

/// Field of a loop stack frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopField {
    /// Packed loop bounds in LA layout.
    La,
    /// Iterations left.
    Lc,
}

/// Address register class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddrReg {
    /// Address.
    An,
    /// Step.
    Nn,
    /// Mode.
    Mn,
}

fn stack_slot(name: &'static str, n: usize, depth: usize) -> SimResult<usize> {
    if n < depth {
        Ok(n)
    } else {
        Err(SimError::InvalidField {
            mnemonic: name,
            field: "num",
            value: n as u64,
        })
    }
}

impl Machine {
    /// Committed control register.
    pub const fn debug_ctrlreg(&self, reg: CtrlReg) -> u64 {
        self.regs.ctrl(reg)
    }

    /// Committed FCCR or FCSR of one section.
    pub fn debug_fpu_ctrlreg(&self, reg: FpuCtrlReg, section: usize) -> SimResult<u64> {
        let id = match reg {
            FpuCtrlReg::Fccr => RegId::fccr(section),
            FpuCtrlReg::Fcsr => RegId::fcsr(section),
        };
        self.read_raw(id)
    }

    /// Committed general-purpose register.
    pub fn debug_gpr(&self, n: usize) -> SimResult<u64> {
        self.read_raw(RegId::gpr(n))
    }

    /// Committed FPR `n` of one section.
    pub fn debug_fpr(&self, section: usize, n: usize) -> SimResult<u64> {
        self.read_raw(RegId::fpr(section, n))
    }

    /// Loop stack frame `n`.
    pub fn debug_lstack(&self, n: usize, field: LoopField) -> SimResult<u64> {
        let frame = self.flow.lstack[stack_slot("debug_lstack", n, self.flow.lstack.len())?];
        Ok(match field {
            LoopField::La => u64::from(frame.la.bits()),
            LoopField::Lc => u64::from(frame.lc),
        })
    }

    /// Call stack slot `n` (a return address).
    pub fn debug_pstack(&self, n: usize) -> SimResult<u64> {
        let slot = stack_slot("debug_pstack", n, self.flow.pstack.len())?;
        Ok(u64::from(self.flow.pstack[slot]))
    }

    /// Committed address register.
    pub fn debug_addr_reg(&self, n: usize, kind: AddrReg) -> SimResult<u64> {
        let id = match kind {
            AddrReg::An => RegId::addr_an(n),
            AddrReg::Nn => RegId::addr_nn(n),
            AddrReg::Mn => RegId::addr_mn(n),
        };
        self.read_raw(id)
    }
}
