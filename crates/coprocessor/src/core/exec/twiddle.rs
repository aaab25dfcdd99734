//! Twiddle generation and the FFT butterfly.
//!
//! `GETCOEFF` and `CFLY` derive a unit complex coefficient from the RIND
//! control register. RIND is read once through the bypass network before
//! any section runs, and is stepped by RSTEP under RMASK afterwards, so
//! consecutive instructions walk the twiddle table.

use std::f64::consts::PI;

use crate::common::constants::{RIND_MASK, delay};
use crate::common::{CtrlReg, RegId, RegVal, SimResult};
use crate::core::arch::status::{CONTROL_I, TwiddleIndex};
use crate::core::machine::Machine;
use crate::core::units::fpu::Fpu;
use crate::core::units::fpu::adjust::SIGN;
use crate::isa::{HiOp, Instruction};

use super::{complex, pack};

/// Angle units per full turn.
const TURN: f64 = 65536.0;

/// Unit coefficient `(re, im)` selected by a twiddle index.
///
/// The 13-bit address covers one eighth of a turn; bits 13..15 mirror,
/// swap and negate it into the other octants. CONTROL.i conjugates.
pub(crate) fn coefficient(fpu: &Fpu<'_>, t: TwiddleIndex, control: u64) -> (u32, u32) {
    let angle = if t.quarter {
        0x2000
    } else if t.b13 {
        (0x2000 - t.addr) & 0x1fff
    } else {
        t.addr & 0x1fff
    };
    let theta = f64::from(angle) * 2.0 * PI / TURN;
    let (cos, sin) = fpu.cos_sin(theta);

    let (mut re, mut im) = if t.b13 ^ t.b14 { (sin, cos) } else { (cos, sin) };
    if t.b14 ^ t.b15 {
        re ^= SIGN;
    }
    if t.b15 ^ (control & CONTROL_I != 0) {
        im ^= SIGN;
    }
    (re, im)
}

/// RIND after one step: `((rind + rstep) & rmask) | (rind & !rmask)`.
pub(crate) const fn step_index(rind: u64, rstep: u64, rmask: u64) -> u64 {
    (rind.wrapping_add(rstep) & rmask) | (rind & !rmask)
}

impl Machine {
    /// Runs stage 1 of `GETCOEFF` or `CFLY`.
    pub(crate) fn execute_twiddle(&mut self, instr: Instruction, op: HiOp) -> SimResult<()> {
        let rind_id = RegId::ctrl(CtrlReg::Rind);
        let rind = self.bypass_value(rind_id)?;
        let index = TwiddleIndex::from_bits(rind as u32);

        self.for_sections(instr, op, true, |l| {
            let w = coefficient(&l.fpu, index, l.control());
            if op == HiOp::Cfly {
                complex::butterfly(l, instr, w);
            } else {
                l.write_fpr(instr.fd(), pack(w.0, w.1));
            }
            Ok(())
        })?;

        let rstep = self.regs.ctrl(CtrlReg::Rstep);
        let rmask = self.regs.ctrl(CtrlReg::Rmask);
        let next = step_index(rind, rstep, rmask);
        self.schedule_write(rind_id, RegVal::masked(next, RIND_MASK), delay::MOVE_CTRL, true)
    }
}
