//! Architectural state of the coprocessor.
//!
//! This module holds the storage the guest program can name:
//! 1. **Register File:** GPR, index, address, per-section FPR/FCCR/FCSR and control registers.
//! 2. **Bit Layouts:** STATUS, CONTROL, FCSR, LA and RIND fields.

/// Register storage.
pub mod regfile;

/// Control and status bit layouts.
pub mod status;

pub use regfile::{RegisterFile, SectionRegs};
