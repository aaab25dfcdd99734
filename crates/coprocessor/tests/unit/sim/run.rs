//! Simulator run loop.

use k128cp2_core::Config;
use k128cp2_core::sim::Simulator;
use pretty_assertions::assert_eq;

use crate::common::builder::Vliw;
use crate::common::builder::vliw::NOP;
use crate::common::harness::TestContext;

/// The run ends once the program stopped and its writes drained.
#[test]
fn run_reports_stop_code() {
    let mut tc = TestContext::new().load(&[Vliw::new().stopi(0x42).build()]);
    let outcome = tc.run();
    assert!(outcome.stopped);
    assert_eq!(outcome.stop_code, 0x42);
    assert!(tc.machine().queue.is_empty());
    assert!(!tc.machine().is_running());
}

/// A program that loops forever hits the configured limit.
#[test]
fn endless_loop_hits_cycle_limit() {
    let mut config = Config::default();
    config.run.max_cycles = 120;
    let mut sim = Simulator::new(config);
    sim.load(&[Vliw::new().jumpi(0).build(), NOP]).unwrap();
    let outcome = sim.run().unwrap();
    assert!(!outcome.stopped);
    assert_eq!(outcome.cycles, 120);
    assert!(sim.machine.is_running());
}

/// A non-zero start address skips the words before it.
#[test]
fn start_pc_is_honored() {
    let mut config = Config::default();
    config.run.start_pc = 2;
    let mut tc = TestContext::with_config(config).load(&[
        Vliw::new().stopi(1).build(),
        NOP,
        Vliw::new().stopi(2).build(),
    ]);
    assert_eq!(tc.run().stop_code, 2);
}

/// Snapshots are captured on start and stop when enabled.
#[test]
fn snapshots_on_run_and_stop() {
    let mut config = Config::default();
    config.snapshot.on_run = true;
    config.snapshot.on_stop = true;
    let mut tc = TestContext::with_config(config).load(&[
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().stopi(3).build(),
    ]);
    tc.run();
    let snaps = tc.sim.drain_snapshots();
    assert_eq!(snaps.len(), 2);
    assert!(snaps[0].clock < snaps[1].clock);
    assert_eq!(snaps[1].iram[1], Vliw::new().stopi(3).build());
    assert!(tc.sim.drain_snapshots().is_empty());
}

/// Without autostart nothing runs.
#[test]
fn no_autostart_stays_idle() {
    let mut config = Config::default();
    config.run.autostart = false;
    let mut sim = Simulator::new(config);
    sim.load(&[Vliw::new().stopi(9).build()]).unwrap();
    let outcome = sim.run().unwrap();
    assert!(outcome.stopped);
    assert_eq!(outcome.stop_code, 0);
    assert_eq!(outcome.cycles, 1);
}
