//! Standalone run loop.
//!
//! The [`Simulator`] plays the host: it loads a program into IRAM, starts it
//! with a `RUNI` pushed through the instruction FIFO and clocks the machine
//! until the program has stopped and everything in flight has drained.

use tracing::{debug, info, warn};

use crate::common::SimResult;
use crate::common::constants::ADDR_MASK;
use crate::config::Config;
use crate::core::machine::{HostReg, Machine, StateSnapshot};
use crate::isa::{Instruction, LoOp};

/// Result of [`Simulator::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// STOPCODE register at the end of the run.
    pub stop_code: u64,
    /// Clocks simulated by this run.
    pub cycles: u64,
    /// False if the cycle limit was hit first.
    pub stopped: bool,
}

/// A machine driven by a simple host.
#[derive(Debug)]
pub struct Simulator {
    /// The simulated coprocessor.
    pub machine: Machine,
    cycle: u64,
}

/// Encodes `RUNI target` with a NOP hi half.
pub const fn runi_word(target: u32) -> Instruction {
    Instruction(((LoOp::RunI as u64) << 23) | (target as u64 & ADDR_MASK))
}

impl Simulator {
    /// Creates a simulator around a fresh machine.
    pub fn new(config: Config) -> Self {
        Self {
            machine: Machine::new(config),
            cycle: 0,
        }
    }

    /// Copies a program into IRAM starting at address 0.
    pub fn load(&mut self, program: &[u64]) -> SimResult<()> {
        self.machine.iram[..].fill(0);
        self.machine.iram_write(program)?;
        self.machine.reset();
        debug!(words = program.len(), "program placed at 0");
        Ok(())
    }

    /// Pushes `RUNI target` into the instruction FIFO.
    pub fn start(&mut self, target: u32) -> SimResult<()> {
        self.machine.reg_write(HostReg::Fifo, runi_word(target).0, u64::MAX, false)
    }

    /// Returns true once nothing is running, queued or in flight.
    const fn quiescent(&self) -> bool {
        let m = &self.machine;
        !m.is_running() && !m.pending_work() && m.queue.is_empty() && m.cal.is_empty() && m.lmem_pipe.is_empty()
    }

    /// Clocks the machine until it is quiescent or `max_cycles` elapse.
    ///
    /// If the configuration enables autostart, `RUNI start_pc` is pushed
    /// first.
    pub fn run(&mut self) -> SimResult<RunOutcome> {
        let run = self.machine.config.run.clone();
        if run.autostart {
            self.start(run.start_pc)?;
        }

        let first = self.cycle;
        let mut stopped = false;
        while self.cycle - first < run.max_cycles {
            self.machine.clock(self.cycle)?;
            self.cycle += 1;
            if self.quiescent() {
                stopped = true;
                break;
            }
        }

        let outcome = RunOutcome {
            stop_code: self.machine.stop_code(),
            cycles: self.cycle - first,
            stopped,
        };
        if stopped {
            info!(stop_code = outcome.stop_code, cycles = outcome.cycles, "program stopped");
        } else {
            warn!(cycles = outcome.cycles, pc = self.machine.flow.newpc, "cycle limit reached");
        }
        Ok(outcome)
    }

    /// Takes the snapshots captured on `RUN`/`STOP` during the run.
    pub fn drain_snapshots(&mut self) -> Vec<StateSnapshot> {
        self.machine.drain_snapshots()
    }
}
