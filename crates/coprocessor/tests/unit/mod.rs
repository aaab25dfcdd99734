//! # Behavioral Tests
//!
//! Tests are grouped by the part of the coprocessor they exercise. Most of
//! them assemble a short program with the VLIW builder, run it through the
//! simulator and inspect the committed state afterwards.

/// Scheduler, pipelines, control flow, arithmetic and the host boundary.
pub mod core;

/// Disassembler output.
pub mod isa;

/// Program loading, configuration files and the run loop.
pub mod sim;
