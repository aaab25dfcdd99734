//! Coprocessor core implementation.
//!
//! This module contains everything that runs inside the coprocessor: the
//! architectural state, the two execution pipelines with their delayed-write
//! queue, the per-opcode execution handlers and the machine that sequences
//! them clock by clock.

/// Architectural state (register file, status and control layouts).
pub mod arch;

/// Stage-1 execution handlers for every opcode.
pub mod exec;

/// The machine value: scheduler, control flow, host boundary and snapshots.
pub mod machine;

/// Pipelines (ring buffer, cal and lmem pipes, delayed-write queue, address arithmetic).
pub mod pipeline;

/// Execution units (floating-point datapath).
pub mod units;

pub use self::machine::Machine;
