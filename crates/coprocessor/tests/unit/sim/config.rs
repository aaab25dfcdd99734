//! Configuration file loading.

use k128cp2_core::Config;
use pretty_assertions::assert_eq;

#[test]
fn reads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.json");
    std::fs::write(
        &path,
        r#"{ "run": { "max_cycles": 77, "start_pc": 4 }, "dump": { "gpr": true } }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.run.max_cycles, 77);
    assert_eq!(config.run.start_pc, 4);
    assert!(config.run.autostart);
    assert!(config.dump.gpr);
    assert!(config.dump.any_halt_dump());
    assert!(!config.snapshot.on_stop);
}

#[test]
fn rejects_unknown_keys_and_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.json");
    std::fs::write(&path, r#"{ "run": { "max_cycle": 10 } }"#).unwrap();
    assert!(Config::from_file(&path).is_err());
    assert!(Config::from_file(dir.path().join("absent.json")).is_err());
}
