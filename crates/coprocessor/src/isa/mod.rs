//! Instruction set of the k128cp2 coprocessor.
//!
//! A VLIW word pairs one arithmetic operation with one memory/control operation:
//!
//! * `instruction`: the `Instruction` newtype and its field table.
//! * `opcodes`: the `HiOp` and `LoOp` tables and memory-access parameters.
//! * `disasm`: assembly text for dumps and diagnostics.

/// Instruction disassembler.
pub mod disasm;

/// Instruction word and field extraction.
pub mod instruction;

/// Opcode tables.
pub mod opcodes;

pub use instruction::{Field, Instruction, fields};
pub use opcodes::{AccessClass, AddrMode, DataSize, HiOp, LoOp, MemAccess};
