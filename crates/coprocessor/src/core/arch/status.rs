//! STATUS, CONTROL, FCSR and loop-address bit layouts.
//!
//! This module fixes where every architectural flag lives:
//! 1. **STATUS:** Run/FIFO/COMM handshake flags, accumulated FP exceptions and sticky stack errors.
//! 2. **CONTROL:** Rounding mode, twiddle sign control, stop and reset requests.
//! 3. **FCSR:** Per-section accumulated flags and last-operation cause.
//! 4. **LA/RIND:** Packed loop addresses and twiddle index fields.

use serde::{Deserialize, Serialize};

/// STATUS: program running.
pub const STATUS_RUN: u64 = 1 << 0;
/// STATUS: host FIFO full.
pub const STATUS_FF: u64 = 1 << 1;
/// STATUS: host FIFO empty.
pub const STATUS_FE: u64 = 1 << 2;
/// STATUS: COMM written by the coprocessor, not yet read by the host.
pub const STATUS_COMMCP2: u64 = 1 << 3;
/// STATUS: COMM written by the host, not yet read by the coprocessor.
pub const STATUS_COMMK64: u64 = 1 << 4;
/// STATUS: debug pending.
pub const STATUS_DEP: u64 = 1 << 15;
/// STATUS: shift of the accumulated FP exception field.
pub const STATUS_FPE_SHIFT: u32 = 16;
/// STATUS: accumulated FP exception field (I, U, O, Z, V, E).
pub const STATUS_FPE: u64 = 0x3f << STATUS_FPE_SHIFT;
/// STATUS: call stack push overflow (sticky).
pub const STATUS_POE: u64 = 1 << 23;
/// STATUS: call stack pop underflow (sticky).
pub const STATUS_PUE: u64 = 1 << 24;
/// STATUS: loop stack push overflow (sticky).
pub const STATUS_LOE: u64 = 1 << 25;
/// STATUS: loop stack pop underflow (sticky).
pub const STATUS_LUE: u64 = 1 << 26;

/// CONTROL: rounding mode field.
pub const CONTROL_RM: u64 = 0x3;
/// CONTROL: twiddle imaginary-part sign control.
pub const CONTROL_I: u64 = 1 << 15;
/// CONTROL: stop request.
pub const CONTROL_ST: u64 = 1 << 30;
/// CONTROL: reset request.
pub const CONTROL_RS: u64 = 1 << 31;

/// FCSR: shift of the accumulated flags field.
pub const FCSR_FLAGS_SHIFT: u32 = 2;
/// FCSR: shift of the cause field.
pub const FCSR_CAUSE_SHIFT: u32 = 12;
/// FCSR: accumulated flags field.
pub const FCSR_FLAGS: u64 = 0x3f << FCSR_FLAGS_SHIFT;
/// FCSR: cause field.
pub const FCSR_CAUSE: u64 = 0x3f << FCSR_CAUSE_SHIFT;

/// Packed loop start/end addresses held in LA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopAddr {
    /// First instruction of the loop body.
    pub start: u32,
    /// Last instruction of the loop body.
    pub end: u32,
}

impl LoopAddr {
    /// Unpacks an LA register value.
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            start: (bits >> 16) & 0x1fff,
            end: bits & 0x1fff,
        }
    }

    /// Packs into an LA register value.
    pub const fn bits(self) -> u32 {
        ((self.start & 0x1fff) << 16) | (self.end & 0x1fff)
    }
}

/// Decoded twiddle index register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TwiddleIndex {
    /// Angle address, bits 12:0.
    pub addr: u32,
    /// Mirror the angle (bit 13).
    pub b13: bool,
    /// Swap sin/cos (bit 14).
    pub b14: bool,
    /// Quadrant sign (bit 15).
    pub b15: bool,
    /// True when bits 13:0 encode the exact quarter turn.
    pub quarter: bool,
}

impl TwiddleIndex {
    /// Decodes a RIND value.
    pub const fn from_bits(rind: u32) -> Self {
        Self {
            addr: rind & 0x1fff,
            b13: rind & (1 << 13) != 0,
            b14: rind & (1 << 14) != 0,
            b15: rind & (1 << 15) != 0,
            quarter: rind & 0x3fff == 0x2000,
        }
    }
}
