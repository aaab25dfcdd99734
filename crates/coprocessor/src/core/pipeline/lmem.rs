//! Memory/control (lmem) pipeline entries.
//!
//! Stage behavior depends on the access class:
//!
//! | Class          | Stage 1             | Stage 2                  | Stage 3   |
//! |----------------|---------------------|--------------------------|-----------|
//! | Load           | address             | read memory, write AN    | write FPR |
//! | Store          | address, read FPR   | write AN, write memory   |           |
//! | Address update | address             | write AN                 |           |
//! | Other          | opcode handler      |                          |           |

use crate::common::constants::{LMEM_STAGES, NUM_SECTIONS};
use crate::isa::{AddrMode, Instruction, LoOp, MemAccess};

use super::stage::{Pipe, Staged};

/// One in-flight lo operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LmemEntry {
    /// Originating instruction word.
    pub instr: Instruction,
    /// Decoded lo operation.
    pub op: LoOp,
    /// Access parameters; `None` for handler-only operations.
    pub access: Option<MemAccess>,
    /// Issue clock.
    pub ticket: u64,
    /// Next stage to execute.
    pub stage: u8,
    /// Entry has no effect.
    pub annulled: bool,
    /// Address register number.
    pub rn: usize,
    /// FPR loaded or stored.
    pub fpr: usize,
    /// Signed offset for register-plus-offset accesses.
    pub offset: i32,
    /// Effective address, known after stage 1.
    pub addr: u32,
    /// Updated address register value, known after stage 1.
    pub an_new: u32,
    /// Per-section data words.
    pub data: [[u64; 2]; NUM_SECTIONS],
}

impl LmemEntry {
    /// Decodes a new entry at stage 0.
    pub fn new(instr: Instruction, op: LoOp, ticket: u64, annulled: bool) -> Self {
        let access = op.mem_access();
        let (addr, offset) = match access.map(|a| a.mode) {
            Some(AddrMode::Imm) => (instr.imm13(), 0),
            Some(AddrMode::Offset) => (0, instr.offset13()),
            _ => (0, 0),
        };
        Self {
            instr,
            op,
            access,
            ticket,
            stage: 0,
            annulled,
            rn: instr.gs(),
            fpr: instr.ft2(),
            offset,
            addr,
            an_new: 0,
            data: [[0; 2]; NUM_SECTIONS],
        }
    }
}

impl Staged for LmemEntry {
    const PIPE: &'static str = "lmem";
    const DEPTH: u8 = LMEM_STAGES;

    fn stage(&self) -> u8 {
        self.stage
    }

    fn ticket(&self) -> u64 {
        self.ticket
    }
}

/// The memory pipeline; four entries cover every stage.
pub type LmemPipe = Pipe<LmemEntry, { LMEM_STAGES as usize }>;
