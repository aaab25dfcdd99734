//! Arithmetic (cal) pipeline entries.
//!
//! Stage 0 models issue latency, stage 1 runs the hi operation and
//! schedules its results, stages 2 to 8 only age the entry so that the
//! result delays line up with retirement.

use crate::common::constants::CAL_STAGES;
use crate::isa::{HiOp, Instruction};

use super::stage::{Pipe, Staged};

/// One in-flight hi operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalEntry {
    /// Originating instruction word.
    pub instr: Instruction,
    /// Decoded hi operation.
    pub op: HiOp,
    /// Issue clock.
    pub ticket: u64,
    /// Next stage to execute.
    pub stage: u8,
    /// Entry has no effect.
    pub annulled: bool,
}

impl CalEntry {
    /// Creates an entry at stage 0.
    pub const fn new(instr: Instruction, op: HiOp, ticket: u64, annulled: bool) -> Self {
        Self {
            instr,
            op,
            ticket,
            stage: 0,
            annulled,
        }
    }
}

impl Staged for CalEntry {
    const PIPE: &'static str = "cal";
    const DEPTH: u8 = CAL_STAGES;

    fn stage(&self) -> u8 {
        self.stage
    }

    fn ticket(&self) -> u64 {
        self.ticket
    }
}

/// The arithmetic pipeline; nine entries cover every stage.
pub type CalPipe = Pipe<CalEntry, { CAL_STAGES as usize }>;
