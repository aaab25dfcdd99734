//! Snapshot persistence tests.

use k128cp2_core::Config;
use k128cp2_core::core::machine::{Machine, StateSnapshot};
use pretty_assertions::assert_eq;

use crate::common::builder::Vliw;
use crate::common::builder::vliw::NOP;
use crate::common::harness::TestContext;

fn finished_program() -> TestContext {
    let program = [
        Vliw::new().seti(1, 0x123).build(),
        Vliw::new().updaddrnp(3).build(),
        NOP,
        Vliw::new().stop(1).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    tc.machine_mut().lmem_write(3, 0x10, &[0xdead_beef]).unwrap();
    tc.set_fpr_all(12, 0x1234_5678);
    tc.run();
    tc
}

/// A snapshot written to disk restores into a fresh machine unchanged.
#[test]
fn file_round_trip_restores_state() {
    let tc = finished_program();
    let snap = tc.machine().snapshot();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    snap.write_file(&path).unwrap();

    let loaded = StateSnapshot::read_file(&path).unwrap();
    assert_eq!(loaded, snap);

    let mut fresh = Machine::new(Config::default());
    fresh.restore(&loaded).unwrap();
    assert_eq!(fresh.debug_gpr(1).unwrap(), 0x123);
    assert_eq!(fresh.regs.an[3], 1);
    assert_eq!(fresh.debug_fpr(2, 12).unwrap(), 0x1234_5678);
    assert_eq!(fresh.lmem[3][0x10], 0xdead_beef);
    assert!(!fresh.is_running());
    assert_eq!(fresh.snapshot().registers, snap.registers);
}

/// Every persisted name appears in a captured snapshot.
#[test]
fn snapshot_holds_every_register_name() {
    let snap = Machine::new(Config::default()).snapshot();
    let names = StateSnapshot::register_names();
    assert_eq!(snap.registers.len(), names.len());
    for name in &names {
        assert!(snap.registers.contains_key(name), "missing {name}");
    }
}

/// A malformed file is reported, not half-loaded.
#[test]
fn malformed_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"clock\": 1}").unwrap();
    assert!(StateSnapshot::read_file(&path).is_err());
    assert!(StateSnapshot::read_file(dir.path().join("missing.json")).is_err());
}
