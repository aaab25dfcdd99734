//! Complex arithmetic.
//!
//! An FPR holds one single-precision complex number with the real part in
//! the high lane and the imaginary part in the low lane. Operands are
//! screened, every primitive result is adjusted.

use crate::common::SimResult;
use crate::core::units::fpu::Fpu;
use crate::isa::Instruction;

use super::{Lanes, hi, lo, pack};

/// A complex value as `(re, im)` bit patterns.
type Complex = (u32, u32);

const fn split(v: u64) -> Complex {
    (hi(v), lo(v))
}

const fn join((re, im): Complex) -> u64 {
    pack(re, im)
}

fn add(fpu: &mut Fpu<'_>, a: Complex, b: Complex) -> Complex {
    (fpu.add(a.0, b.0), fpu.add(a.1, b.1))
}

fn sub(fpu: &mut Fpu<'_>, a: Complex, b: Complex) -> Complex {
    (fpu.sub(a.0, b.0), fpu.sub(a.1, b.1))
}

/// `a * b`.
pub(crate) fn mul(fpu: &mut Fpu<'_>, a: Complex, b: Complex) -> Complex {
    let rr = fpu.mul(a.0, b.0);
    let ii = fpu.mul(a.1, b.1);
    let ri = fpu.mul(a.0, b.1);
    let ir = fpu.mul(a.1, b.0);
    (fpu.sub(rr, ii), fpu.add(ri, ir))
}

/// `a * conj(b)`.
fn mul_conj(fpu: &mut Fpu<'_>, a: Complex, b: Complex) -> Complex {
    let rr = fpu.mul(a.0, b.0);
    let ii = fpu.mul(a.1, b.1);
    let ri = fpu.mul(a.0, b.1);
    let ir = fpu.mul(a.1, b.0);
    (fpu.add(rr, ii), fpu.sub(ir, ri))
}

/// Screened `(fs, ft)` of the instruction.
fn sources(l: &mut Lanes<'_>, i: Instruction) -> (Complex, Complex) {
    let a = split(l.operand(i.fs()));
    let b = split(l.operand(i.ft()));
    (a, b)
}

pub(crate) fn cadd(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let r = add(&mut l.fpu, a, b);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn csub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let r = sub(&mut l.fpu, a, b);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

/// `fd = fs + ft`, `fq = fs - ft`.
pub(crate) fn caddsub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let s = add(&mut l.fpu, a, b);
    let d = sub(&mut l.fpu, a, b);
    l.write_fpr(i.fd(), join(s));
    l.write_fpr(i.fq(), join(d));
    Ok(())
}

pub(crate) fn cneg(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = split(l.operand(i.fs()));
    let r = (l.fpu.neg(a.0), l.fpu.neg(a.1));
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn cconj(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = split(l.operand(i.fs()));
    let r = (a.0, l.fpu.neg(a.1));
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn cmul(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let r = mul(&mut l.fpu, a, b);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn cmadd(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let acc = split(l.operand(i.fd()));
    let p = mul(&mut l.fpu, a, b);
    let r = add(&mut l.fpu, acc, p);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn cmsub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let acc = split(l.operand(i.fd()));
    let p = mul(&mut l.fpu, a, b);
    let r = sub(&mut l.fpu, acc, p);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

/// `fd = fs * i`.
pub(crate) fn cmuli(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = split(l.operand(i.fs()));
    let r = (l.fpu.neg(a.1), a.0);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

/// `fd = fs * -i`.
pub(crate) fn cmulni(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let a = split(l.operand(i.fs()));
    let r = (a.1, l.fpu.neg(a.0));
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn chmul(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let r = mul_conj(&mut l.fpu, a, b);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn chmadd(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let acc = split(l.operand(i.fd()));
    let p = mul_conj(&mut l.fpu, a, b);
    let r = add(&mut l.fpu, acc, p);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

pub(crate) fn chmsub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let (a, b) = sources(l, i);
    let acc = split(l.operand(i.fd()));
    let p = mul_conj(&mut l.fpu, a, b);
    let r = sub(&mut l.fpu, acc, p);
    l.write_fpr(i.fd(), join(r));
    Ok(())
}

/// Radix-2 butterfly: `t = fs * w`, `fd = fd + t`, `fs = fd - t`.
pub(crate) fn butterfly(l: &mut Lanes<'_>, i: Instruction, w: Complex) {
    let x = split(l.operand(i.fd()));
    let y = split(l.operand(i.fs()));
    let t = mul(&mut l.fpu, y, w);
    let top = add(&mut l.fpu, x, t);
    let bottom = sub(&mut l.fpu, x, t);
    l.write_fpr(i.fd(), join(top));
    l.write_fpr(i.fs(), join(bottom));
}

/// Butterfly with the twiddle taken from `ft`.
pub(crate) fn cfly2(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let w = split(l.operand(i.ft()));
    butterfly(l, i, w);
    Ok(())
}
