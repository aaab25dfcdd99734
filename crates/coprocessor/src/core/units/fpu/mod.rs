//! Floating-Point Unit (FPU).
//!
//! This module implements the per-section floating-point datapath used by
//! stage 1 of the arithmetic pipeline. The hardware wraps every IEEE
//! primitive in its own operand screening and result adjustment, and
//! accumulates exception flags per section for FCSR and STATUS.fpe.
//!
//! Operations are organized into submodules:
//! - [`exception_flags`]: The six-bit exception flag set.
//! - [`rounding_modes`]: CONTROL.RM decoding.
//! - [`adjust`]: Operand screening and per-mode result adjustment.
//! - [`library`]: The primitive library seam and its host implementation.
//! - [`range`]: Argument range reduction for the elementary functions.

/// Operand screening and result adjustment.
pub mod adjust;

/// Floating-point exception flag types.
pub mod exception_flags;

/// Arithmetic primitive library.
pub mod library;

/// Argument range reduction.
pub mod range;

/// Rounding mode definitions and support.
pub mod rounding_modes;

use std::cmp::Ordering;

use self::adjust::{SIGN, adjust_operand_pair, adjust_result, adjust_result_rs};
use self::exception_flags::FpFlags;
use self::library::FloatLibrary;
use self::rounding_modes::RoundingMode;

/// Elementary functions evaluated by the library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Elementary {
    /// `1 / x`.
    Recip,
    /// `1 / sqrt(x)`.
    Rsqrt,
    /// `sin(πx/2) / x`.
    Sinc,
    /// `(2/π) atan(x) / x`.
    Atanc,
    /// `log2(x) / (x - 1)`.
    Log2c,
    /// `2^x`.
    Exp2,
}

/// Per-section floating-point calculation context.
///
/// Every arithmetic helper applies result adjustment under the current
/// rounding mode and accumulates the raised flags, so a stage handler can
/// compute a whole instruction and collect [`Fpu::flags`] once at the end.
#[derive(Debug)]
pub struct Fpu<'a> {
    lib: &'a dyn FloatLibrary,
    rm: RoundingMode,
    flags: FpFlags,
}

impl<'a> Fpu<'a> {
    /// Creates a context with no flags raised.
    pub fn new(lib: &'a dyn FloatLibrary, rm: RoundingMode) -> Self {
        Self {
            lib,
            rm,
            flags: FpFlags::NONE,
        }
    }

    /// Returns the rounding mode in effect.
    pub const fn rounding_mode(&self) -> RoundingMode {
        self.rm
    }

    /// Returns the accumulated flags with the invalid-operation screen applied.
    pub const fn flags(&self) -> FpFlags {
        self.flags.screened()
    }

    /// Raises additional flags.
    pub fn raise(&mut self, flags: FpFlags) {
        self.flags |= flags;
    }

    /// Screens both lanes of a register operand.
    pub fn operand(&mut self, v: u64) -> u64 {
        let (v, flags) = adjust_operand_pair(v);
        self.flags |= flags;
        v
    }

    fn finish(&mut self, (r, flags): (u32, FpFlags)) -> u32 {
        let (r, flags) = adjust_result(r, flags, self.rm);
        self.flags |= flags;
        r
    }

    fn finish_rs(&mut self, (r, flags): (u32, FpFlags)) -> u32 {
        let (r, flags) = adjust_result_rs(r, flags);
        self.flags |= flags;
        r
    }

    /// Adjusted `a + b`.
    pub fn add(&mut self, a: u32, b: u32) -> u32 {
        let r = self.lib.add(a, b, self.rm);
        self.finish(r)
    }

    /// Adjusted `a - b`.
    pub fn sub(&mut self, a: u32, b: u32) -> u32 {
        let r = self.lib.sub(a, b, self.rm);
        self.finish(r)
    }

    /// Adjusted `a * b`.
    pub fn mul(&mut self, a: u32, b: u32) -> u32 {
        let r = self.lib.mul(a, b, self.rm);
        self.finish(r)
    }

    /// Adjusted `-a`.
    pub fn neg(&mut self, a: u32) -> u32 {
        self.finish((a ^ SIGN, FpFlags::NONE))
    }

    /// Adjusted `|a|`.
    pub fn abs(&mut self, a: u32) -> u32 {
        self.finish((a & !SIGN, FpFlags::NONE))
    }

    /// Adjusted `a * 2^n`.
    pub fn scale(&mut self, a: u32, n: i32) -> u32 {
        let r = self.lib.scale(a, n, self.rm);
        self.finish(r)
    }

    /// Adjusted conversion of a signed word.
    pub fn from_i32(&mut self, v: i32) -> u32 {
        let r = self.lib.from_i32(v, self.rm);
        self.finish(r)
    }

    /// Conversion to a signed word under the current rounding mode.
    pub fn to_i32(&mut self, a: u32) -> i32 {
        let (r, flags) = self.lib.to_i32(a, self.rm);
        self.flags |= flags;
        r
    }

    /// Adjusted result of a library elementary function.
    pub fn elementary(&mut self, func: Elementary, x: u32) -> u32 {
        let r = match func {
            Elementary::Recip => self.lib.recip(x),
            Elementary::Rsqrt => self.lib.rsqrt(x),
            Elementary::Sinc => self.lib.sinc(x),
            Elementary::Atanc => self.lib.atanc(x),
            Elementary::Log2c => self.lib.log2c(x),
            Elementary::Exp2 => self.lib.exp2(x),
        };
        self.finish_rs(r)
    }

    /// Adjusted result of a range reduction.
    pub fn reduced(&mut self, f: fn(u32) -> u32, x: u32) -> u32 {
        self.finish_rs((f(x), FpFlags::NONE))
    }

    /// Returns `(cos θ, sin θ)` from the library.
    pub fn cos_sin(&self, theta: f64) -> (u32, u32) {
        self.lib.cos_sin(theta)
    }

    /// Orders two screened operands; `None` if either is a NaN.
    pub fn compare(&self, a: u32, b: u32) -> Option<Ordering> {
        self.lib.compare(a, b)
    }

    /// Conversion to a signed word, rounding toward zero.
    pub fn trunc_i32(&mut self, a: u32) -> i32 {
        let (r, flags) = self.lib.to_i32(a, RoundingMode::Rz);
        self.flags |= flags;
        r
    }
}
