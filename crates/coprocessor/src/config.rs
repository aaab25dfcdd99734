//! Configuration for the k128cp2 simulator.
//!
//! This module defines the knobs a host or the CLI may turn. It provides:
//! 1. **Defaults:** Baseline run limits and the program entry point.
//! 2. **Structures:** Dump selection, snapshot capture and run control sections.
//! 3. **Loading:** JSON parsing from a string or a file, rejecting unknown keys.
//!
//! Every field has a default, so `{}` is a valid configuration and
//! `Config::default()` is what a bare [`Machine::new`](crate::Machine::new) uses.

use std::path::Path;

use serde::Deserialize;

use crate::common::SimResult;
use crate::common::constants::NUM_SECTIONS;

/// Default configuration constants for the simulator.
mod defaults {
    /// Clocks the CLI runs before giving up on a program that never stops.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// IRAM address started by the CLI.
    pub const START_PC: u32 = 0;

    /// Prefix of snapshot files written by the CLI.
    pub const SNAPSHOT_PREFIX: &str = "k128cp2_state";
}

/// Root simulator configuration.
///
/// # Examples
///
/// ```
/// use k128cp2_core::config::Config;
///
/// let json = r#"{
///     "dump": { "stop_code": true, "lmem_sections": [true, false, false, false] },
///     "snapshot": { "on_stop": true },
///     "run": { "max_cycles": 5000 }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert!(config.dump.stop_code);
/// assert!(config.snapshot.on_stop);
/// assert_eq!(config.run.max_cycles, 5000);
/// assert!(config.run.autostart);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional state dumps emitted through `tracing`.
    #[serde(default)]
    pub dump: DumpConfig,
    /// Snapshot capture on `RUN`/`STOP`.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Run-loop limits used by the CLI driver.
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Selection of the dumps written under the `k128cp2::dump` tracing target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpConfig {
    /// Disassemble every issued instruction word.
    #[serde(default)]
    pub instructions: bool,
    /// Report the code of every `STOP`/`STOPI`.
    #[serde(default)]
    pub stop_code: bool,
    /// Dump FPR, FCCR and FCSR of every section on stop.
    #[serde(default)]
    pub fpu: bool,
    /// Dump the general-purpose registers on stop.
    #[serde(default)]
    pub gpr: bool,
    /// Dump the address registers on stop.
    #[serde(default)]
    pub addr_regs: bool,
    /// Dump the control registers on stop.
    #[serde(default)]
    pub ctrl_regs: bool,
    /// Dump the loop stack on stop and on every loop push/pop.
    #[serde(default)]
    pub loop_stack: bool,
    /// Dump the call stack on stop and on every call/return.
    #[serde(default)]
    pub call_stack: bool,
    /// Dump local memory of the selected sections on stop.
    #[serde(default)]
    pub lmem_sections: [bool; NUM_SECTIONS],
}

impl DumpConfig {
    /// Returns true if any stop-time dump is selected.
    pub fn any_halt_dump(&self) -> bool {
        self.fpu
            || self.gpr
            || self.addr_regs
            || self.ctrl_regs
            || self.loop_stack
            || self.call_stack
            || self.lmem_sections.iter().any(|s| *s)
    }
}

/// State snapshot capture.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Capture a snapshot when `RUN`/`RUNI` starts the program.
    #[serde(default)]
    pub on_run: bool,
    /// Capture a snapshot when `STOP`/`STOPI` halts the program.
    #[serde(default)]
    pub on_stop: bool,
    /// File name prefix used when the CLI writes captured snapshots.
    #[serde(default = "SnapshotConfig::default_prefix")]
    pub file_prefix: String,
}

impl SnapshotConfig {
    fn default_prefix() -> String {
        defaults::SNAPSHOT_PREFIX.to_string()
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            on_run: false,
            on_stop: false,
            file_prefix: Self::default_prefix(),
        }
    }
}

/// Run-loop control.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Clock limit.
    #[serde(default = "RunConfig::default_max_cycles")]
    pub max_cycles: u64,
    /// Entry point passed to the injected `RUNI`.
    #[serde(default = "RunConfig::default_start_pc")]
    pub start_pc: u32,
    /// Inject `RUNI start_pc` after loading the program.
    #[serde(default = "RunConfig::default_autostart")]
    pub autostart: bool,
}

impl RunConfig {
    /// Returns the default clock limit.
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    /// Returns the default entry point.
    fn default_start_pc() -> u32 {
        defaults::START_PC
    }

    fn default_autostart() -> bool {
        true
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
            start_pc: defaults::START_PC,
            autostart: true,
        }
    }
}
