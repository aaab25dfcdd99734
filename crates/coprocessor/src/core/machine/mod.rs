//! Coprocessor Machine Definition and Initialization.
//!
//! This module defines the central `Machine` structure, the single owner of
//! every piece of coprocessor state. It coordinates the following:
//! 1. **Storage:** Register file, instruction memory and the four local memory banks.
//! 2. **Pipelines:** The cal and lmem pipes, the delayed-write queue and the host FIFO.
//! 3. **Control Flow:** Jump, loop and call bookkeeping that runs ahead of the committed registers.
//! 4. **Host Integration:** The clock entry point, host register access, DMA hooks and snapshots.

/// Register reads, bypass lookups and the commit path.
pub mod access;

/// Side-effect free inspection for debuggers.
pub mod debug;

/// Optional state dumps.
pub mod dump;

/// Jump, loop and call sequencing.
pub mod flow;

/// Host-facing register, FIFO and memory access.
pub mod host;

/// Per-clock scheduler.
pub mod scheduler;

/// Serializable machine state.
pub mod snapshot;

use std::fmt;

use crate::common::RegId;
use crate::common::constants::{HOST_FIFO_CAPACITY, IRAM_WORDS, LMEM_WORDS, NUM_SECTIONS};
use crate::config::Config;
use crate::core::arch::RegisterFile;
use crate::core::pipeline::{CalPipe, DelayedWriteQueue, LmemPipe, RingBuffer};
use crate::core::units::fpu::library::{FloatLibrary, HostFloat};
use crate::isa::Instruction;

pub use flow::{FlowState, LoopFrame};
pub use host::{DmaController, HostReg};
pub use snapshot::StateSnapshot;

/// One word pushed by the host into the instruction FIFO.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FifoEntry {
    /// Instruction word.
    pub instr: Instruction,
    /// Pre-load into IRAM at PC instead of executing.
    pub ldc2: bool,
}

/// A `SYNC` or `STOP` countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Drain {
    /// Countdown is active.
    pub pending: bool,
    /// Clocks left.
    pub counter: u32,
}

impl Drain {
    /// Starts a countdown of `clocks`.
    pub const fn start(&mut self, clocks: u32) {
        self.pending = true;
        self.counter = clocks;
    }

    /// Advances the countdown by one clock.
    pub const fn tick(&mut self) {
        if self.pending {
            self.counter = self.counter.saturating_sub(1);
            if self.counter == 0 {
                self.pending = false;
            }
        }
    }
}

/// The k128cp2 coprocessor.
///
/// All state lives here and is mutated only by [`Machine::clock`] and the
/// host boundary methods. Several machines may coexist; nothing is shared.
pub struct Machine {
    /// Architectural registers.
    pub regs: RegisterFile,
    /// Instruction memory.
    pub iram: Vec<u64>,
    /// Local memory, one bank per section.
    pub lmem: [Vec<u64>; NUM_SECTIONS],

    /// Arithmetic pipeline.
    pub cal: CalPipe,
    /// Memory/control pipeline.
    pub lmem_pipe: LmemPipe,
    /// Delayed register writes.
    pub queue: DelayedWriteQueue,
    /// Host instruction FIFO.
    pub fifo: RingBuffer<FifoEntry, HOST_FIFO_CAPACITY>,

    /// Jump, loop and call state.
    pub flow: FlowState,
    /// Newly issued entries have no effect.
    pub nulify: bool,
    /// `SYNC` countdown.
    pub sync: Drain,
    /// `STOP` countdown.
    pub stop: Drain,
    /// Program is running from IRAM.
    pub run_flag: bool,
    /// The last issued word came from the host FIFO.
    pub instr_from_fifo: bool,
    /// `START_DMA` was executed and not yet collected by the host.
    pub start_dma: bool,
    /// A CONTROL.RS reset happened this clock; the PC is left at its reset value.
    pub reset_request: bool,

    /// Registers committed this clock with their values before the write.
    pub written: Vec<(RegId, u64)>,
    /// Run configuration.
    pub config: Config,
    /// Arithmetic primitives.
    pub lib: Box<dyn FloatLibrary>,
    /// DMA controller queried by `CHECK_DMA`.
    pub dma: Option<Box<dyn DmaController>>,
    /// Snapshots captured on run/stop.
    pub snapshots: Vec<StateSnapshot>,
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("pc", &self.regs.pc())
            .field("clock", &self.regs.ctrl(crate::common::CtrlReg::ClockCount))
            .field("run_flag", &self.run_flag)
            .field("cal", &self.cal.len())
            .field("lmem_pipe", &self.lmem_pipe.len())
            .field("queue", &self.queue.len())
            .field("fifo", &self.fifo.len())
            .finish_non_exhaustive()
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Machine {
    /// Creates a machine in its reset state with zeroed memories.
    ///
    /// # Arguments
    ///
    /// * `config` - Dump, snapshot and run settings.
    ///
    /// # Returns
    ///
    /// A machine using the host floating-point library and no DMA controller.
    pub fn new(config: Config) -> Self {
        Self::with_library(config, Box::new(HostFloat))
    }

    /// Creates a machine with a custom arithmetic primitive library.
    pub fn with_library(config: Config, lib: Box<dyn FloatLibrary>) -> Self {
        Self {
            regs: RegisterFile::new(),
            iram: vec![0; IRAM_WORDS],
            lmem: std::array::from_fn(|_| vec![0; LMEM_WORDS]),
            cal: CalPipe::new(),
            lmem_pipe: LmemPipe::new(),
            queue: DelayedWriteQueue::new(),
            fifo: RingBuffer::new(),
            flow: FlowState::default(),
            nulify: false,
            sync: Drain::default(),
            stop: Drain::default(),
            run_flag: false,
            instr_from_fifo: false,
            start_dma: false,
            reset_request: false,
            written: Vec::new(),
            config,
            lib,
            dma: None,
            snapshots: Vec::new(),
        }
    }

    /// Empties pipelines, queue, FIFO and stacks and loads the register reset image.
    ///
    /// Memories and the clock counter are preserved.
    pub(crate) fn reset_state(&mut self) {
        self.regs.reset();
        self.cal.clear();
        self.lmem_pipe.clear();
        self.queue.clear();
        self.fifo.clear();
        self.flow = FlowState::default();
        self.nulify = false;
        self.sync = Drain::default();
        self.stop = Drain::default();
        self.run_flag = false;
        self.instr_from_fifo = false;
        self.start_dma = false;
        self.written.clear();
    }

    /// Returns true while the program runs from IRAM.
    pub const fn is_running(&self) -> bool {
        self.run_flag
    }

    /// Current clock counter.
    pub const fn clock_count(&self) -> u64 {
        self.regs.ctrl(crate::common::CtrlReg::ClockCount)
    }
}
