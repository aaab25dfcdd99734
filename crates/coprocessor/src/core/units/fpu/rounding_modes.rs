//! Floating-point rounding mode support.
//!
//! The rounding mode lives in CONTROL bits 1:0 and applies to every
//! arithmetic primitive and to result saturation:
//!
//! | Value | Mode | Description                          |
//! |-------|------|--------------------------------------|
//! | 0b00  | RN   | Round to Nearest, ties to Even       |
//! | 0b01  | RZ   | Round towards Zero                   |
//! | 0b10  | RP   | Round Up (towards +∞)                |
//! | 0b11  | RM   | Round Down (towards −∞)              |

use crate::core::arch::status::CONTROL_RM;

/// Coprocessor rounding mode encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundingMode {
    /// Round to Nearest, ties to Even.
    #[default]
    Rn = 0b00,
    /// Round towards Zero.
    Rz = 0b01,
    /// Round Up (towards +∞).
    Rp = 0b10,
    /// Round Down (towards −∞).
    Rm = 0b11,
}

impl RoundingMode {
    /// Decodes a 2-bit rounding mode field; every encoding is valid.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0b00 => Self::Rn,
            0b01 => Self::Rz,
            0b10 => Self::Rp,
            _ => Self::Rm,
        }
    }

    /// Extracts the rounding mode from a CONTROL value.
    pub const fn from_control(control: u64) -> Self {
        Self::from_bits((control & CONTROL_RM) as u8)
    }
}
