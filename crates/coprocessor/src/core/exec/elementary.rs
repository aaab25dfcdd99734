//! Elementary functions and range reduction.
//!
//! The single-lane functions take their argument from one half of `fs` and
//! write one half of `fd`, as selected by `elf_cond`:
//!
//! | elf_cond | source | destination |
//! |----------|--------|-------------|
//! | 0        | lo     | lo          |
//! | 1        | hi     | lo          |
//! | 2        | lo     | hi          |
//! | 3        | hi     | hi          |
//!
//! Results use the rounding-mode independent adjustment.

use crate::common::{Half, SimResult};
use crate::core::units::fpu::{Elementary, range};
use crate::isa::Instruction;

use super::{Lanes, hi, lo, pack};

fn single(l: &mut Lanes<'_>, i: Instruction, func: Elementary) {
    let cond = i.elf_cond();
    let s = l.operand(i.fs());
    let x = if cond & 1 != 0 { hi(s) } else { lo(s) };
    let half = if cond & 2 != 0 { Half::Hi } else { Half::Lo };
    let r = l.fpu.elementary(func, x);
    l.write_half(i.fd(), half, r);
}

pub(crate) fn recip(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    single(l, i, Elementary::Recip);
    Ok(())
}

pub(crate) fn rsqrt(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    single(l, i, Elementary::Rsqrt);
    Ok(())
}

pub(crate) fn sinc(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    single(l, i, Elementary::Sinc);
    Ok(())
}

pub(crate) fn atanc(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    single(l, i, Elementary::Atanc);
    Ok(())
}

pub(crate) fn log2c(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    single(l, i, Elementary::Log2c);
    Ok(())
}

pub(crate) fn exp2(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    single(l, i, Elementary::Exp2);
    Ok(())
}

/// Applies a range reduction to both halves of `fs`.
fn reduce_both(l: &mut Lanes<'_>, i: Instruction, f: fn(u32) -> u32) -> u64 {
    let s = l.operand(i.fs());
    let h = l.fpu.reduced(f, hi(s));
    let lw = l.fpu.reduced(f, lo(s));
    pack(h, lw)
}

pub(crate) fn rrsin(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let r = reduce_both(l, i, range::rr_sin);
    l.write_fpr(i.fd(), r);
    Ok(())
}

pub(crate) fn rrcos(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let r = reduce_both(l, i, range::rr_cos);
    l.write_fpr(i.fd(), r);
    Ok(())
}

/// `fd.hi` = reduced cosine, `fd.lo` = reduced sine, both of `fs.lo`.
pub(crate) fn rrcossin(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let x = lo(l.operand(i.fs()));
    let c = l.fpu.reduced(range::rr_cos, x);
    let s = l.fpu.reduced(range::rr_sin, x);
    l.write_fpr(i.fd(), pack(c, s));
    Ok(())
}

/// Mantissa part into `fd`, exponent part into `fq`.
pub(crate) fn rrlog2(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let m = reduce_both(l, i, range::rr_log2_mantissa);
    let e = reduce_both(l, i, range::rr_log2_exponent);
    l.write_fpr(i.fd(), m);
    l.write_fpr(i.fq(), e);
    Ok(())
}
