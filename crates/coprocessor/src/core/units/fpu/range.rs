//! Argument range reduction for the table-driven elementary functions.
//!
//! These are exact bit manipulations, not library primitives: the
//! fractional part of a normal single is always representable, so only the
//! sub-unit branch of [`rr_cos`] needs arithmetic.

use super::adjust::{INF, SIGN, is_denorm, is_nan};

const ONE: u32 = 0x3f80_0000;
const NAN: u32 = 0x7fc0_0000;

/// Splits a normal single with unbiased exponent `0..=24` into the low bits
/// of its integer part and its fractional part (as single bits).
fn int_frac(x: u32, exp: i32) -> (u32, f32) {
    let mant = x & 0x007f_ffff;
    if exp == 24 {
        return (mant << 1, 0.0);
    }
    let int = (mant | 0x0080_0000) >> (23 - exp);
    let frac = (mant << exp) & 0x007f_ffff;
    (int, frac as f32 / 8_388_608.0)
}

fn unbiased_exp(x: u32) -> i32 {
    ((x >> 23) & 0xff) as i32 - 127
}

fn is_special(x: u32) -> bool {
    is_nan(x) || x & !SIGN == INF || x & !SIGN == 0 || is_denorm(x)
}

/// Reduces a sine argument (in quarter turns) to `[-1, 1]`.
pub fn rr_sin(x: u32) -> u32 {
    if is_nan(x) {
        return x;
    }
    if x & !SIGN == INF {
        return NAN;
    }
    if is_special(x) {
        return x;
    }
    let exp = unbiased_exp(x);
    if exp < 0 {
        return x;
    }
    if exp > 24 {
        return x & SIGN;
    }
    let (int, frac) = int_frac(x, exp);
    let r = match int & 0x3 {
        0 => frac,
        1 => 1.0 - frac,
        2 => -frac,
        _ => -(1.0 - frac),
    };
    let r = if x & SIGN == 0 { r } else { -r };
    r.to_bits()
}

/// Reduces a cosine argument (in quarter turns) to `[-1, 1]`.
pub fn rr_cos(x: u32) -> u32 {
    if is_nan(x) {
        return x;
    }
    if x & !SIGN == INF {
        return NAN;
    }
    if is_special(x) {
        return ONE;
    }
    let exp = unbiased_exp(x);
    if exp < 0 {
        return (1.0 - f32::from_bits(x & !SIGN)).to_bits();
    }
    if exp > 24 {
        return ONE;
    }
    let (int, frac) = int_frac(x, exp);
    let r = match int & 0x3 {
        0 => 1.0 - frac,
        1 => -frac,
        2 => -(1.0 - frac),
        _ => frac,
    };
    r.to_bits()
}

/// Mantissa part of a logarithm argument: the exponent forced to 127.
pub fn rr_log2_mantissa(x: u32) -> u32 {
    if is_nan(x) {
        return NAN;
    }
    if is_special(x) {
        return x;
    }
    (x & 0x807f_ffff) | ONE
}

/// Exponent part of a logarithm argument as a single.
pub fn rr_log2_exponent(x: u32) -> u32 {
    if is_special(x) {
        return 0;
    }
    (unbiased_exp(x) as f32).to_bits()
}
