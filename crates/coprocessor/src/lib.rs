//! k128cp2 coprocessor simulator library.
//!
//! This crate implements a clock-accurate model of the k128cp2 VLIW
//! vector/complex floating-point coprocessor with the following:
//! 1. **Core:** Cal and lmem pipelines, the delayed-write queue with bypass forwarding,
//!    hardware loop and call stacks, and four SIMD execution sections.
//! 2. **ISA:** Decoding, execution and disassembly of the hi (arithmetic) and lo
//!    (memory/control) halves of every 64-bit instruction word.
//! 3. **Host Boundary:** Register, FIFO and memory access for the host CPU, DMA hooks,
//!    debug reads and JSON state snapshots.
//! 4. **Simulation:** Program loading and a run loop for standalone use.
//!
//! # Examples
//!
//! ```
//! use k128cp2_core::{Config, Machine};
//! use k128cp2_core::core::machine::HostReg;
//!
//! let mut machine = Machine::new(Config::default());
//! // STOPI 0x2a, sent through the instruction FIFO.
//! machine.reg_write(HostReg::Fifo, (0x08 << 23) | 0x2a, u64::MAX, false).unwrap();
//! for cycle in 0..16 {
//!     machine.clock(cycle).unwrap();
//! }
//! assert_eq!(machine.stop_code(), 0x2a);
//! ```

/// Common types and constants (register identifiers, errors, pinned sizes and delays).
pub mod common;
/// Simulator configuration (dumps, snapshots, run limits).
pub mod config;
/// Coprocessor core (arch, pipelines, execution, machine).
pub mod core;
/// Instruction set (word layout, opcode tables, disassembler).
pub mod isa;
/// Program loader and run-loop driver.
pub mod sim;

/// Root configuration type; use `Config::default()` or load it from JSON.
pub use crate::config::Config;
/// The coprocessor; construct with `Machine::new` and drive with `Machine::clock`.
pub use crate::core::Machine;
