//! Matrix-vector and dot-product operations.
//!
//! A 2x2 matrix occupies the FPR pair `{fs, fs+1}`, one row per register
//! with the first column in the high lane. A 2-vector occupies one FPR.
//! Every product and partial sum is adjusted as it is formed.

use crate::common::SimResult;
use crate::core::units::fpu::Fpu;
use crate::isa::Instruction;

use super::{Lanes, hi, lo, pack};

/// `x.hi * y.hi + x.lo * y.lo`.
fn dot(fpu: &mut Fpu<'_>, x: u64, y: u64) -> u32 {
    let h = fpu.mul(hi(x), hi(y));
    let l = fpu.mul(lo(x), lo(y));
    fpu.add(h, l)
}

/// How the product is combined with the destination.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Accumulate {
    Replace,
    Add,
    Sub,
}

fn combine(fpu: &mut Fpu<'_>, acc: Accumulate, d: u32, p: u32) -> u32 {
    match acc {
        Accumulate::Replace => p,
        Accumulate::Add => fpu.add(d, p),
        Accumulate::Sub => fpu.sub(d, p),
    }
}

/// `fd (op)= M * ft` with `M = {fs, fs+1}`, optionally transposed.
fn matvec(l: &mut Lanes<'_>, i: Instruction, transpose: bool, acc: Accumulate) {
    let row0 = l.operand(i.fs());
    let row1 = l.operand(i.fs() + 1);
    let v = l.operand(i.ft());
    let d = if acc == Accumulate::Replace { 0 } else { l.operand(i.fd()) };

    let (r0, r1) = if transpose {
        (pack(hi(row0), hi(row1)), pack(lo(row0), lo(row1)))
    } else {
        (row0, row1)
    };
    let p0 = dot(&mut l.fpu, r0, v);
    let h = combine(&mut l.fpu, acc, hi(d), p0);
    let p1 = dot(&mut l.fpu, r1, v);
    let lw = combine(&mut l.fpu, acc, lo(d), p1);
    l.write_fpr(i.fd(), pack(h, lw));
}

pub(crate) fn mvmul(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    matvec(l, i, false, Accumulate::Replace);
    Ok(())
}

pub(crate) fn mtvmul(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    matvec(l, i, true, Accumulate::Replace);
    Ok(())
}

pub(crate) fn mvmadd(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    matvec(l, i, false, Accumulate::Add);
    Ok(())
}

pub(crate) fn mtvmadd(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    matvec(l, i, true, Accumulate::Add);
    Ok(())
}

pub(crate) fn mvmsub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    matvec(l, i, false, Accumulate::Sub);
    Ok(())
}

pub(crate) fn mtvmsub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    matvec(l, i, true, Accumulate::Sub);
    Ok(())
}

/// Transposes the 2x2 matrix with rows `fs`, `ft` into rows `fd`, `fq`.
pub(crate) fn mtrans(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = l.raw(i.fs());
    let b = l.raw(i.ft());
    l.write_fpr(i.fd(), pack(hi(a), hi(b)));
    l.write_fpr(i.fq(), pack(lo(a), lo(b)));
    Ok(())
}

/// Four-term dot product of `{fs, fs+1}` and `{ft, ft+1}`.
///
/// The sum replaces `fd.lo` (mode 0) or `fd.hi` (mode 1); the other lane
/// is written back unchanged.
pub(crate) fn qsdot(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let fs = l.operand(i.fs());
    let fss = l.operand(i.fs() + 1);
    let ft = l.operand(i.ft());
    let ftt = l.operand(i.ft() + 1);
    let d = l.raw(i.fd());

    let first = dot(&mut l.fpu, fs, ft);
    let second = dot(&mut l.fpu, fss, ftt);
    let r = l.fpu.add(first, second);
    let out = if i.mode() == 0 { pack(hi(d), r) } else { pack(r, lo(d)) };
    l.write_fpr(i.fd(), out);
    Ok(())
}
