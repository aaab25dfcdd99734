use k128cp2_core::Config;
use k128cp2_core::core::machine::{HostReg, Machine};
use k128cp2_core::sim::{RunOutcome, Simulator};

/// Default clock budget for [`TestContext::run`].
pub const MAX_TEST_CYCLES: u64 = 2_000;

/// A simulator plus the helpers most tests need.
pub struct TestContext {
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(mut config: Config) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        config.run.max_cycles = MAX_TEST_CYCLES;
        Self {
            sim: Simulator::new(config),
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.sim.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.sim.machine
    }

    /// Places `program` at IRAM address 0.
    pub fn load(mut self, program: &[u64]) -> Self {
        self.sim.load(program).unwrap();
        self
    }

    /// Starts at address 0 and clocks until the machine is quiescent.
    pub fn run(&mut self) -> RunOutcome {
        let outcome = self.sim.run().unwrap();
        assert!(outcome.stopped, "program did not stop within {MAX_TEST_CYCLES} clocks");
        outcome
    }

    /// Advances `n` clocks.
    pub fn clock(&mut self, n: u64) {
        let start = self.sim.machine.clock_count();
        for c in start..start + n {
            self.sim.machine.clock(c).unwrap();
        }
    }

    /// Pushes an execute-now word into the instruction FIFO.
    pub fn push(&mut self, word: u64) {
        self.sim.machine.reg_write(HostReg::Fifo, word, u64::MAX, false).unwrap();
    }

    pub fn gpr(&self, n: usize) -> u64 {
        self.sim.machine.debug_gpr(n).unwrap()
    }

    pub fn fpr(&self, section: usize, n: usize) -> u64 {
        self.sim.machine.debug_fpr(section, n).unwrap()
    }

    /// Sets FPR `n` of every section.
    pub fn set_fpr_all(&mut self, n: usize, bits: u64) {
        for section in &mut self.sim.machine.regs.sections {
            section.fpr[n] = bits;
        }
    }
}
