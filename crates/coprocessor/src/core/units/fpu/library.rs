//! Arithmetic primitive library.
//!
//! Every floating-point primitive the coprocessor needs is a pure function
//! from operand bits to `(result bits, exception flags)`. The
//! [`FloatLibrary`] trait is the seam between the stage handlers and the
//! implementation; [`HostFloat`] implements it on top of the host's IEEE
//! arithmetic:
//! 1. **Add/Sub:** exact two-sum in double precision, then a directed
//!    rounding step to single precision.
//! 2. **Mul/Scale/Convert:** exact in double precision, then rounded.
//! 3. **Elementary functions:** evaluated in double precision and rounded
//!    to nearest.

use std::cmp::Ordering;

use super::adjust::{INF, SIGN, is_nan};
use super::exception_flags::FpFlags;
use super::rounding_modes::RoundingMode;

/// Quiet NaN returned by invalid operations.
const DEFAULT_NAN: u32 = 0x7fc0_0000;

/// Pure single-precision arithmetic primitives.
///
/// Operands and results are raw IEEE-754 single bit patterns. Results are
/// unadjusted; callers apply the coprocessor's result adjustment.
pub trait FloatLibrary: std::fmt::Debug {
    /// Returns `a + b`.
    fn add(&self, a: u32, b: u32, rm: RoundingMode) -> (u32, FpFlags);

    /// Returns `a - b`.
    fn sub(&self, a: u32, b: u32, rm: RoundingMode) -> (u32, FpFlags) {
        self.add(a, b ^ SIGN, rm)
    }

    /// Returns `a * b`.
    fn mul(&self, a: u32, b: u32, rm: RoundingMode) -> (u32, FpFlags);

    /// Returns `a * 2^n`.
    fn scale(&self, a: u32, n: i32, rm: RoundingMode) -> (u32, FpFlags);

    /// Converts a signed word to single precision.
    fn from_i32(&self, v: i32, rm: RoundingMode) -> (u32, FpFlags);

    /// Converts a single to a signed word; out-of-range values saturate with NV.
    fn to_i32(&self, a: u32, rm: RoundingMode) -> (i32, FpFlags);

    /// Returns `1 / x`.
    fn recip(&self, x: u32) -> (u32, FpFlags);

    /// Returns `1 / sqrt(x)`.
    fn rsqrt(&self, x: u32) -> (u32, FpFlags);

    /// Returns `sin(πx/2) / x`.
    fn sinc(&self, x: u32) -> (u32, FpFlags);

    /// Returns `atan(x) / x` scaled by `2/π`.
    fn atanc(&self, x: u32) -> (u32, FpFlags);

    /// Returns `log2(x) / (x - 1)`.
    fn log2c(&self, x: u32) -> (u32, FpFlags);

    /// Returns `2^x`.
    fn exp2(&self, x: u32) -> (u32, FpFlags);

    /// Returns `(cos θ, sin θ)` rounded to single precision.
    fn cos_sin(&self, theta: f64) -> (u32, u32);

    /// Orders two singles; `None` if either is a NaN.
    fn compare(&self, a: u32, b: u32) -> Option<Ordering> {
        f32::from_bits(a).partial_cmp(&f32::from_bits(b))
    }
}

/// [`FloatLibrary`] backed by host floating-point arithmetic.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostFloat;

/// Next representable single towards +∞.
const fn next_up(bits: u32) -> u32 {
    if is_nan(bits) || bits == INF {
        bits
    } else if bits & !SIGN == 0 {
        1
    } else if bits & SIGN == 0 {
        bits + 1
    } else {
        bits - 1
    }
}

/// Next representable single towards −∞.
const fn next_down(bits: u32) -> u32 {
    next_up(bits ^ SIGN) ^ SIGN
}

/// Rounds the exact value `hi + lo` (with `|lo|` far below one ulp of `hi`)
/// to single precision.
fn round_to_single(hi: f64, lo: f64, rm: RoundingMode) -> (u32, FpFlags) {
    if hi.is_nan() {
        return (DEFAULT_NAN, FpFlags::NV);
    }
    let nearest = hi as f32;
    if nearest.is_infinite() && hi.is_finite() {
        let sign = if hi < 0.0 { SIGN } else { 0 };
        return (sign | INF, FpFlags::OF | FpFlags::NX);
    }
    let diff = hi - f64::from(nearest);
    let dir = if diff != 0.0 {
        diff.signum()
    } else if lo != 0.0 {
        lo.signum()
    } else {
        0.0
    };
    let mut bits = nearest.to_bits();
    if dir != 0.0 {
        bits = match rm {
            RoundingMode::Rn => bits,
            RoundingMode::Rz if nearest > 0.0 && dir < 0.0 => next_down(bits),
            RoundingMode::Rz if nearest < 0.0 && dir > 0.0 => next_up(bits),
            RoundingMode::Rz => bits,
            RoundingMode::Rp if dir > 0.0 => next_up(bits),
            RoundingMode::Rm if dir < 0.0 => next_down(bits),
            RoundingMode::Rp | RoundingMode::Rm => bits,
        };
    }
    let mut flags = FpFlags::NONE;
    if dir != 0.0 {
        flags |= FpFlags::NX;
        let mag = bits & !SIGN;
        if mag == INF {
            flags |= FpFlags::OF;
        } else if mag < 0x0080_0000 {
            flags |= FpFlags::UF;
        }
    }
    (bits, flags)
}

/// Propagates a NaN operand without raising a flag.
fn nan_operand(a: u32, b: u32) -> Option<u32> {
    if is_nan(a) {
        Some(a)
    } else if is_nan(b) {
        Some(b)
    } else {
        None
    }
}

/// Rounds a double precision function value to nearest.
fn elementary(value: f64) -> (u32, FpFlags) {
    round_to_single(value, 0.0, RoundingMode::Rn)
}

impl FloatLibrary for HostFloat {
    fn add(&self, a: u32, b: u32, rm: RoundingMode) -> (u32, FpFlags) {
        if let Some(nan) = nan_operand(a, b) {
            return (nan, FpFlags::NONE);
        }
        let x = f64::from(f32::from_bits(a));
        let y = f64::from(f32::from_bits(b));
        if x.is_infinite() && y.is_infinite() && x.signum() != y.signum() {
            return (DEFAULT_NAN, FpFlags::NV);
        }
        let s = x + y;
        if s == 0.0 && x != 0.0 {
            // Exact cancellation: the zero takes the sign of the rounding direction.
            let sign = if rm == RoundingMode::Rm { SIGN } else { 0 };
            return (sign, FpFlags::NONE);
        }
        let bb = s - x;
        let err = (x - (s - bb)) + (y - bb);
        round_to_single(s, if s.is_finite() { err } else { 0.0 }, rm)
    }

    fn mul(&self, a: u32, b: u32, rm: RoundingMode) -> (u32, FpFlags) {
        if let Some(nan) = nan_operand(a, b) {
            return (nan, FpFlags::NONE);
        }
        let x = f64::from(f32::from_bits(a));
        let y = f64::from(f32::from_bits(b));
        if (x == 0.0 && y.is_infinite()) || (x.is_infinite() && y == 0.0) {
            return (DEFAULT_NAN, FpFlags::NV);
        }
        round_to_single(x * y, 0.0, rm)
    }

    fn scale(&self, a: u32, n: i32, rm: RoundingMode) -> (u32, FpFlags) {
        if is_nan(a) {
            return (a, FpFlags::NONE);
        }
        let x = f64::from(f32::from_bits(a));
        round_to_single(x * 2f64.powi(n.clamp(-320, 320)), 0.0, rm)
    }

    fn from_i32(&self, v: i32, rm: RoundingMode) -> (u32, FpFlags) {
        round_to_single(f64::from(v), 0.0, rm)
    }

    fn to_i32(&self, a: u32, rm: RoundingMode) -> (i32, FpFlags) {
        if is_nan(a) {
            return (i32::MAX, FpFlags::NV);
        }
        let x = f64::from(f32::from_bits(a));
        let r = match rm {
            RoundingMode::Rn => x.round_ties_even(),
            RoundingMode::Rz => x.trunc(),
            RoundingMode::Rp => x.ceil(),
            RoundingMode::Rm => x.floor(),
        };
        if r > f64::from(i32::MAX) {
            return (i32::MAX, FpFlags::NV);
        }
        if r < f64::from(i32::MIN) {
            return (i32::MIN, FpFlags::NV);
        }
        let flags = if r == x { FpFlags::NONE } else { FpFlags::NX };
        (r as i32, flags)
    }

    fn recip(&self, x: u32) -> (u32, FpFlags) {
        if is_nan(x) {
            return (x, FpFlags::NONE);
        }
        let v = f64::from(f32::from_bits(x));
        if v == 0.0 {
            return ((x & SIGN) | INF, FpFlags::DZ);
        }
        elementary(1.0 / v)
    }

    fn rsqrt(&self, x: u32) -> (u32, FpFlags) {
        if is_nan(x) {
            return (x, FpFlags::NONE);
        }
        let v = f64::from(f32::from_bits(x));
        if v == 0.0 {
            return ((x & SIGN) | INF, FpFlags::DZ);
        }
        if v < 0.0 {
            return (DEFAULT_NAN, FpFlags::NV);
        }
        elementary(1.0 / v.sqrt())
    }

    fn sinc(&self, x: u32) -> (u32, FpFlags) {
        if is_nan(x) {
            return (x, FpFlags::NONE);
        }
        let v = f64::from(f32::from_bits(x));
        if v.is_infinite() {
            return (DEFAULT_NAN, FpFlags::NV);
        }
        if v == 0.0 {
            return elementary(std::f64::consts::FRAC_PI_2);
        }
        elementary((std::f64::consts::FRAC_PI_2 * v).sin() / v)
    }

    fn atanc(&self, x: u32) -> (u32, FpFlags) {
        if is_nan(x) {
            return (x, FpFlags::NONE);
        }
        let v = f64::from(f32::from_bits(x));
        if v.is_infinite() {
            return (0, FpFlags::NONE);
        }
        if v == 0.0 {
            return elementary(std::f64::consts::FRAC_2_PI);
        }
        elementary(std::f64::consts::FRAC_2_PI * v.atan() / v)
    }

    fn log2c(&self, x: u32) -> (u32, FpFlags) {
        if is_nan(x) {
            return (x, FpFlags::NONE);
        }
        let v = f64::from(f32::from_bits(x));
        if v < 0.0 {
            return (DEFAULT_NAN, FpFlags::NV);
        }
        if v == 0.0 {
            return (INF, FpFlags::DZ);
        }
        if v.is_infinite() {
            return (0, FpFlags::NONE);
        }
        if v == 1.0 {
            return elementary(std::f64::consts::LOG2_E);
        }
        elementary(v.log2() / (v - 1.0))
    }

    fn exp2(&self, x: u32) -> (u32, FpFlags) {
        if is_nan(x) {
            return (x, FpFlags::NONE);
        }
        let v = f64::from(f32::from_bits(x));
        if v == f64::NEG_INFINITY {
            return (0, FpFlags::NONE);
        }
        if v.is_infinite() {
            return (INF, FpFlags::NONE);
        }
        elementary(v.exp2())
    }

    fn cos_sin(&self, theta: f64) -> (u32, u32) {
        let (s, c) = theta.sin_cos();
        ((c as f32).to_bits(), (s as f32).to_bits())
    }
}
