//! Execution units.
//!
//! The coprocessor has a single functional unit family outside the
//! pipelines themselves: the per-section floating-point datapath.

/// Floating-Point Unit with coprocessor-specific adjustment rules.
pub mod fpu;
