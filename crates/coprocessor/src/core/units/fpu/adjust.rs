//! Operand and result adjustment.
//!
//! The hardware does not compute with NaNs or denormals the IEEE way.
//! Before an operation every operand lane is screened:
//! 1. **NaN** becomes `0xffffffff` and raises NV.
//! 2. **Denormal** is flushed to a signed zero and raises DN.
//!
//! After every primitive the result is adjusted according to the rounding
//! mode: underflow flushes (or rounds up to the smallest normal), overflow
//! saturates or goes to infinity, and any NaN becomes `0x7fffffff`.

use super::exception_flags::FpFlags;
use super::rounding_modes::RoundingMode;

/// Sign bit of a single.
pub const SIGN: u32 = 0x8000_0000;
/// Positive infinity.
pub const INF: u32 = 0x7f80_0000;
/// Largest finite magnitude.
pub const MAX_FINITE: u32 = 0x7f7f_ffff;
/// Smallest normal magnitude.
pub const MIN_NORMAL: u32 = 0x0080_0000;
/// NaN produced by result adjustment.
pub const RESULT_NAN: u32 = 0x7fff_ffff;
/// NaN produced by operand adjustment.
pub const OPERAND_NAN: u32 = 0xffff_ffff;

/// Returns true if `a` is any NaN.
pub const fn is_nan(a: u32) -> bool {
    (a << 1) > 0xff00_0000
}

/// Returns true if `a` is a denormal (zero exponent, non-zero fraction).
pub const fn is_denorm(a: u32) -> bool {
    a & INF == 0 && a & 0x007f_ffff != 0
}

/// Screens one operand lane.
pub const fn adjust_operand(a: u32) -> (u32, FpFlags) {
    let mut a = a;
    let mut flags = 0;
    if is_nan(a) {
        a = OPERAND_NAN;
        flags |= FpFlags::NV.bits();
    }
    if is_denorm(a) {
        a &= SIGN;
        flags |= FpFlags::DN.bits();
    }
    (a, FpFlags::from_bits(flags))
}

/// Screens both lanes of a register pair.
pub const fn adjust_operand_pair(v: u64) -> (u64, FpFlags) {
    let (hi, fh) = adjust_operand((v >> 32) as u32);
    let (lo, fl) = adjust_operand(v as u32);
    (((hi as u64) << 32) | lo as u64, FpFlags::from_bits(fh.bits() | fl.bits()))
}

/// Adjusts a primitive result according to the rounding mode.
///
/// # Arguments
///
/// * `f` - Result bits from the primitive.
/// * `flags` - Flags raised by the primitive.
/// * `rm` - Current rounding mode.
///
/// # Returns
///
/// The adjusted result and the flags including any raised by adjustment.
pub const fn adjust_result(f: u32, flags: FpFlags, rm: RoundingMode) -> (u32, FpFlags) {
    let sign = f & SIGN;
    let positive = sign == 0;
    let mut f = f;
    let mut bits = flags.bits();
    if flags.contains(FpFlags::UF) || is_denorm(f) {
        bits |= FpFlags::UF.bits() | FpFlags::NX.bits();
        f = match rm {
            RoundingMode::Rn | RoundingMode::Rz => sign,
            RoundingMode::Rp => {
                if positive {
                    MIN_NORMAL
                } else {
                    SIGN
                }
            }
            RoundingMode::Rm => {
                if positive {
                    0
                } else {
                    SIGN | MIN_NORMAL
                }
            }
        };
    }
    if flags.contains(FpFlags::OF) {
        f = match rm {
            RoundingMode::Rn => sign | INF,
            RoundingMode::Rz => sign | MAX_FINITE,
            RoundingMode::Rp => {
                if positive {
                    INF
                } else {
                    SIGN | MAX_FINITE
                }
            }
            RoundingMode::Rm => {
                if positive {
                    MAX_FINITE
                } else {
                    SIGN | INF
                }
            }
        };
    }
    if is_nan(f) {
        bits |= FpFlags::NV.bits();
        f = RESULT_NAN;
    }
    (f, FpFlags::from_bits(bits))
}

/// Adjusts an elementary-function result; independent of the rounding mode.
pub const fn adjust_result_rs(f: u32, flags: FpFlags) -> (u32, FpFlags) {
    let sign = f & SIGN;
    let mut f = f;
    let mut bits = flags.bits();
    if flags.contains(FpFlags::UF) || is_denorm(f) {
        bits |= FpFlags::UF.bits() | FpFlags::NX.bits();
        f = sign;
    }
    if flags.contains(FpFlags::OF) {
        f = sign | INF;
    }
    if is_nan(f) {
        bits |= FpFlags::NV.bits();
        f = RESULT_NAN;
    }
    (f, FpFlags::from_bits(bits))
}
