//! Packed-word integer, logic and lane reorganization operations.
//!
//! These operations treat an FPR as raw bits. Arithmetic and shifts work on
//! the two 32-bit halves independently and wrap; logic works on all 64
//! bits. None of them screens operands or raises floating-point flags.

use crate::common::SimResult;
use crate::isa::Instruction;

use super::{Lanes, hi, lo, pack};

/// Applies `f` to both halves of `a` and `b`.
fn halves(a: u64, b: u64, f: impl Fn(u32, u32) -> u32) -> u64 {
    pack(f(hi(a), hi(b)), f(lo(a), lo(b)))
}

fn map_halves(a: u64, f: impl Fn(u32) -> u32) -> u64 {
    pack(f(hi(a)), f(lo(a)))
}

/// `fd = f(fs, ft)` on raw bits.
fn binary(l: &mut Lanes<'_>, i: Instruction, f: impl Fn(u64, u64) -> u64) {
    let r = f(l.raw(i.fs()), l.raw(i.ft()));
    l.write_fpr(i.fd(), r);
}

/// `fd = f(fs)` on raw bits.
fn unary(l: &mut Lanes<'_>, i: Instruction, f: impl Fn(u64) -> u64) {
    let r = f(l.raw(i.fs()));
    l.write_fpr(i.fd(), r);
}

/// Logical shift; positive amounts shift left, negative right.
const fn logical_shift(x: u32, n: i32) -> u32 {
    match n {
        0..=31 => x << n,
        -31..=-1 => x >> -n,
        _ => 0,
    }
}

/// Arithmetic shift; right shifts replicate the sign bit.
const fn arithmetic_shift(x: u32, n: i32) -> u32 {
    match n {
        0..=31 => x << n,
        32.. => 0,
        _ => {
            let n = if n < -31 { 31 } else { -n };
            ((x as i32) >> n) as u32
        }
    }
}

pub(crate) fn clear(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    l.write_fpr(i.fd(), 0);
    Ok(())
}

pub(crate) fn copy(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| a);
    Ok(())
}

pub(crate) fn swaphl(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| a.rotate_left(32));
    Ok(())
}

/// Exchanges `fd` and `fs`.
pub(crate) fn swap64(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let d = l.raw(i.fd());
    let s = l.raw(i.fs());
    l.write_fpr(i.fd(), s);
    l.write_fpr(i.fs(), d);
    Ok(())
}

/// Section number into `fd.lo`.
pub(crate) fn rdsec(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let s = l.section() as u64;
    l.write_fpr(i.fd(), s);
    Ok(())
}

/// Replaces 16-bit lane `lane` of `fd` with `imm16`.
fn load_lane(l: &mut Lanes<'_>, i: Instruction, lane: u32) {
    let shift = lane * 16;
    let d = l.raw(i.fd());
    let r = (d & !(0xffff << shift)) | (u64::from(i.imm16()) << shift);
    l.write_fpr(i.fd(), r);
}

pub(crate) fn li0(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    load_lane(l, i, 0);
    Ok(())
}

pub(crate) fn li1(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    load_lane(l, i, 1);
    Ok(())
}

pub(crate) fn li2(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    load_lane(l, i, 2);
    Ok(())
}

pub(crate) fn li3(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    load_lane(l, i, 3);
    Ok(())
}

pub(crate) fn add(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |a, b| halves(a, b, u32::wrapping_add));
    Ok(())
}

pub(crate) fn sub(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |a, b| halves(a, b, u32::wrapping_sub));
    Ok(())
}

pub(crate) fn abs(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| map_halves(a, |x| (x as i32).wrapping_abs() as u32));
    Ok(())
}

pub(crate) fn neg(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| map_halves(a, u32::wrapping_neg));
    Ok(())
}

pub(crate) fn addi(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let k = i.imm12() as u32;
    unary(l, i, |a| map_halves(a, |x| x.wrapping_add(k)));
    Ok(())
}

pub(crate) fn subi(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let k = i.imm12() as u32;
    unary(l, i, |a| map_halves(a, |x| x.wrapping_sub(k)));
    Ok(())
}

/// Adds `delta` to `fd.lo` in place.
fn step_lo(l: &mut Lanes<'_>, i: Instruction, delta: i32) {
    let d = l.raw(i.fd());
    l.write_fpr(i.fd(), pack(hi(d), lo(d).wrapping_add(delta as u32)));
}

pub(crate) fn inci(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    step_lo(l, i, i.imm18());
    Ok(())
}

pub(crate) fn deci(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    step_lo(l, i, i.imm18().wrapping_neg());
    Ok(())
}

pub(crate) fn and(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |a, b| a & b);
    Ok(())
}

pub(crate) fn or(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |a, b| a | b);
    Ok(())
}

pub(crate) fn xor(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    binary(l, i, |a, b| a ^ b);
    Ok(())
}

pub(crate) fn not(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| !a);
    Ok(())
}

/// Shift amount for the register forms: the signed value of `ft.lo`.
fn shift_amount(l: &Lanes<'_>, i: Instruction) -> i32 {
    lo(l.raw(i.ft())) as i32
}

pub(crate) fn lshift(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let n = shift_amount(l, i);
    unary(l, i, |a| map_halves(a, |x| logical_shift(x, n)));
    Ok(())
}

pub(crate) fn lshifti(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let n = i.imm6();
    unary(l, i, |a| map_halves(a, |x| logical_shift(x, n)));
    Ok(())
}

pub(crate) fn ashift(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let n = shift_amount(l, i);
    unary(l, i, |a| map_halves(a, |x| arithmetic_shift(x, n)));
    Ok(())
}

pub(crate) fn ashifti(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let n = i.imm6();
    unary(l, i, |a| map_halves(a, |x| arithmetic_shift(x, n)));
    Ok(())
}

/// Zero-extends each `bits`-wide lane of a 32-bit word to twice its width.
fn widen(word: u32, bits: u32) -> u64 {
    let mask = (1u64 << bits) - 1;
    (0..32 / bits).fold(0, |acc, k| acc | ((u64::from(word) >> (k * bits)) & mask) << (2 * k * bits))
}

/// Truncates each `2 * bits`-wide lane of a 64-bit word to `bits` and packs them.
fn narrow(word: u64, bits: u32) -> u32 {
    let mask = (1u64 << bits) - 1;
    (0..32 / bits).fold(0, |acc, k| acc | (((word >> (2 * k * bits)) & mask) << (k * bits)) as u32)
}

/// Widens `fs.lo` into `fd` and `fs.hi` into `fq`.
fn split(l: &mut Lanes<'_>, i: Instruction, bits: u32) {
    let s = l.raw(i.fs());
    l.write_fpr(i.fd(), widen(lo(s), bits));
    l.write_fpr(i.fq(), widen(hi(s), bits));
}

/// Narrows `fs` into `fd.lo` and `ft` into `fd.hi`.
fn join(l: &mut Lanes<'_>, i: Instruction, bits: u32) {
    let s = l.raw(i.fs());
    let t = l.raw(i.ft());
    l.write_fpr(i.fd(), pack(narrow(t, bits), narrow(s, bits)));
}

pub(crate) fn split8(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    split(l, i, 8);
    Ok(())
}

pub(crate) fn split16(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    split(l, i, 16);
    Ok(())
}

pub(crate) fn split32(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    split(l, i, 32);
    Ok(())
}

pub(crate) fn join8(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    join(l, i, 8);
    Ok(())
}

pub(crate) fn join16(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    join(l, i, 16);
    Ok(())
}

pub(crate) fn join32(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    join(l, i, 32);
    Ok(())
}

/// Sign-extends the low `from` bits of every `to`-bit lane in place.
const fn extend_lanes(word: u64, from: u32, to: u32) -> u64 {
    let lane_mask = if to == 64 { u64::MAX } else { (1u64 << to) - 1 };
    let mut out = 0;
    let mut k = 0;
    while k < 64 / to {
        let lane = (word >> (k * to)) & lane_mask;
        let shift = 64 - from;
        let extended = (((lane << shift) as i64) >> shift) as u64 & lane_mask;
        out |= extended << (k * to);
        k += 1;
    }
    out
}

pub(crate) fn extsign8h(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| extend_lanes(a, 8, 16));
    Ok(())
}

pub(crate) fn extsign8w(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| extend_lanes(a, 8, 32));
    Ok(())
}

pub(crate) fn extsign16w(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    unary(l, i, |a| extend_lanes(a, 16, 32));
    Ok(())
}
