//! Packed-single arithmetic and conversions.
//!
//! Each FPR is treated as two independent singles. The arithmetic forms
//! screen their operands and adjust every result; the conversions between
//! packed words and packed singles follow CONTROL.RM.

use crate::common::SimResult;
use crate::core::units::fpu::Fpu;
use crate::core::units::fpu::adjust::SIGN;
use crate::isa::Instruction;

use super::{Lanes, hi, lo, pack};

/// Exponent field of a single.
const EXP_MASK: u32 = 0x7f80_0000;
/// Exponent bias.
const EXP_BIAS: i32 = 127;

/// Applies `f` to both lanes of `a` and `b`.
fn lanewise(fpu: &mut Fpu<'_>, a: u64, b: u64, f: fn(&mut Fpu<'_>, u32, u32) -> u32) -> u64 {
    let h = f(fpu, hi(a), hi(b));
    let l = f(fpu, lo(a), lo(b));
    pack(h, l)
}

fn binary(l: &mut Lanes<'_>, i: Instruction, f: fn(&mut Fpu<'_>, u32, u32) -> u32) {
    let a = l.operand(i.fs());
    let b = l.operand(i.ft());
    let r = lanewise(&mut l.fpu, a, b, f);
    l.write_fpr(i.fd(), r);
}

fn unary(l: &mut Lanes<'_>, i: Instruction, f: fn(&mut Fpu<'_>, u32) -> u32) {
    let a = l.operand(i.fs());
    let r = pack(f(&mut l.fpu, hi(a)), f(&mut l.fpu, lo(a)));
    l.write_fpr(i.fd(), r);
}

/// `fd = fd ± fs * ft` per lane.
fn fused(l: &mut Lanes<'_>, i: Instruction, acc: fn(&mut Fpu<'_>, u32, u32) -> u32) {
    let a = l.operand(i.fs());
    let b = l.operand(i.ft());
    let d = l.operand(i.fd());
    let p = lanewise(&mut l.fpu, a, b, |f, x, y| f.mul(x, y));
    let r = lanewise(&mut l.fpu, d, p, acc);
    l.write_fpr(i.fd(), r);
}

pub(crate) fn psadd(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |f, x, y| f.add(x, y));
    Ok(())
}

pub(crate) fn pssub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |f, x, y| f.sub(x, y));
    Ok(())
}

pub(crate) fn psmul(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |f, x, y| f.mul(x, y));
    Ok(())
}

/// `fd = fs + ft`, `fq = fs - ft`.
pub(crate) fn psaddsub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.operand(i.fs());
    let b = l.operand(i.ft());
    let s = lanewise(&mut l.fpu, a, b, |f, x, y| f.add(x, y));
    let d = lanewise(&mut l.fpu, a, b, |f, x, y| f.sub(x, y));
    l.write_fpr(i.fd(), s);
    l.write_fpr(i.fq(), d);
    Ok(())
}

pub(crate) fn psneg(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |f, x| f.neg(x));
    Ok(())
}

pub(crate) fn psabs(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |f, x| f.abs(x));
    Ok(())
}

pub(crate) fn psmadd(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    fused(l, i, |f, x, y| f.add(x, y));
    Ok(())
}

pub(crate) fn psmsub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    fused(l, i, |f, x, y| f.sub(x, y));
    Ok(())
}

/// Magnitudes of `fs` with the signs of `ft`.
pub(crate) fn pscopysign(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.operand(i.fs());
    let b = l.operand(i.ft());
    let lane = |m: u32, s: u32| (m & !SIGN) | (s & SIGN);
    l.write_fpr(i.fd(), pack(lane(hi(a), hi(b)), lane(lo(a), lo(b))));
    Ok(())
}

/// Unbiased exponent of each lane, as a single.
pub(crate) fn psgetexp(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.operand(i.fs());
    let exp = |x: u32| ((x & EXP_MASK) >> 23) as i32 - EXP_BIAS;
    let h = l.fpu.from_i32(exp(hi(a)));
    let lw = l.fpu.from_i32(exp(lo(a)));
    l.write_fpr(i.fd(), pack(h, lw));
    Ok(())
}

/// Mantissa of each lane with the exponent forced to zero.
pub(crate) fn psgetman(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.operand(i.fs());
    let man = |x: u32| (x & !EXP_MASK) | ((EXP_BIAS as u32) << 23);
    l.write_fpr(i.fd(), pack(man(hi(a)), man(lo(a))));
    Ok(())
}

/// `fs * 2^trunc(ft)` per lane.
pub(crate) fn psscale(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.operand(i.fs());
    let b = l.operand(i.ft());
    let nh = l.fpu.trunc_i32(hi(b));
    let nl = l.fpu.trunc_i32(lo(b));
    let h = l.fpu.scale(hi(a), nh);
    let lw = l.fpu.scale(lo(a), nl);
    l.write_fpr(i.fd(), pack(h, lw));
    Ok(())
}

/// Packed signed words to packed singles.
pub(crate) fn pwtops(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.raw(i.fs());
    let h = l.fpu.from_i32(hi(a) as i32);
    let lw = l.fpu.from_i32(lo(a) as i32);
    l.write_fpr(i.fd(), pack(h, lw));
    Ok(())
}

/// Packed singles to packed signed words.
pub(crate) fn pstopw(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.operand(i.fs());
    let h = l.fpu.to_i32(hi(a));
    let lw = l.fpu.to_i32(lo(a));
    l.write_fpr(i.fd(), pack(h as u32, lw as u32));
    Ok(())
}

/// The four signed 16-bit lanes of `ft` as singles: `ft.hi` into `fd`, `ft.lo` into `fs`.
pub(crate) fn unpck16wstops(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let t = l.raw(i.ft());
    let mut convert = |word: u32| {
        let upper = l.fpu.from_i32(i32::from((word >> 16) as i16));
        let lower = l.fpu.from_i32(i32::from(word as i16));
        pack(upper, lower)
    };
    let d = convert(hi(t));
    let s = convert(lo(t));
    l.write_fpr(i.fd(), d);
    l.write_fpr(i.fs(), s);
    Ok(())
}
