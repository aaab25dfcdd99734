//! Serializable machine state.
//!
//! A snapshot holds the committed registers by name, the whole IRAM and the
//! local memory of every section. In-flight pipeline entries, queued writes
//! and the contents of the loop and call stacks are not part of it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::constants::{IRAM_WORDS, LMEM_WORDS, NUM_ADDR_REGS, NUM_FPR, NUM_GPR, NUM_SECTIONS};
use crate::common::{CtrlReg, RegId, RegVal, SimError, SimResult};
use crate::core::arch::status::{LoopAddr, STATUS_RUN};

use super::Machine;

/// Control registers persisted in a snapshot.
const PERSISTED_CTRL: [CtrlReg; 11] = [
    CtrlReg::Pc,
    CtrlReg::Status,
    CtrlReg::Control,
    CtrlReg::Comm,
    CtrlReg::Psp,
    CtrlReg::Lc,
    CtrlReg::La,
    CtrlReg::Lsp,
    CtrlReg::Rind,
    CtrlReg::Rstep,
    CtrlReg::Rmask,
];

/// Committed machine state at one clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Clock counter when the snapshot was taken.
    pub clock: u64,
    /// Register values keyed by [`StateSnapshot::register_names`].
    pub registers: BTreeMap<String, u64>,
    /// Instruction memory.
    pub iram: Vec<u64>,
    /// Local memory, one bank per section.
    pub lmem: Vec<Vec<u64>>,
}

/// Every persisted register with its snapshot name.
fn persisted_registers() -> Vec<(String, RegId)> {
    let mut regs: Vec<(String, RegId)> = PERSISTED_CTRL
        .iter()
        .map(|&r| (r.name().to_string(), RegId::ctrl(r)))
        .collect();
    regs.extend((0..NUM_GPR).map(|n| (format!("gpr{n:02}"), RegId::gpr(n))));
    regs.extend((0..NUM_ADDR_REGS).map(|n| (format!("an{n:02}"), RegId::addr_an(n))));
    regs.extend((0..NUM_ADDR_REGS).map(|n| (format!("nn{n:02}"), RegId::addr_nn(n))));
    regs.extend((0..NUM_ADDR_REGS).map(|n| (format!("mn{n:02}"), RegId::addr_mn(n))));
    for s in 0..NUM_SECTIONS {
        regs.push((format!("section{s}.fccr"), RegId::fccr(s)));
        regs.push((format!("section{s}.fcsr"), RegId::fcsr(s)));
        regs.extend((0..NUM_FPR).map(|n| (format!("section{s}.fpr{n:02}"), RegId::fpr(s, n))));
    }
    regs
}

impl StateSnapshot {
    /// Names of every persisted register, in a stable order.
    pub fn register_names() -> Vec<String> {
        persisted_registers().into_iter().map(|(name, _)| name).collect()
    }

    /// Encodes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot from JSON.
    pub fn from_json(text: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Writes the snapshot to a JSON file.
    pub fn write_file(&self, path: impl AsRef<Path>) -> SimResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a snapshot from a JSON file.
    pub fn read_file(path: impl AsRef<Path>) -> SimResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    fn check_shape(&self) -> SimResult<()> {
        if self.iram.len() != IRAM_WORDS {
            return Err(SimError::Snapshot(format!(
                "iram holds {} words, expected {IRAM_WORDS}",
                self.iram.len()
            )));
        }
        if self.lmem.len() != NUM_SECTIONS || self.lmem.iter().any(|bank| bank.len() != LMEM_WORDS) {
            return Err(SimError::Snapshot(format!(
                "lmem must hold {NUM_SECTIONS} banks of {LMEM_WORDS} words"
            )));
        }
        Ok(())
    }
}

impl Machine {
    /// Captures the committed state.
    pub fn snapshot(&self) -> StateSnapshot {
        let registers = persisted_registers()
            .into_iter()
            .filter_map(|(name, id)| self.read_raw(id).ok().map(|v| (name, v)))
            .collect();
        StateSnapshot {
            clock: self.clock_count(),
            registers,
            iram: self.iram.clone(),
            lmem: self.lmem.to_vec(),
        }
    }

    /// Loads a snapshot into the machine.
    ///
    /// The machine is reset first; registers missing from the snapshot keep
    /// their reset value. The clock counter is not restored.
    ///
    /// # Returns
    ///
    /// `Snapshot` if a memory image has the wrong size or a register name
    /// is unknown.
    pub fn restore(&mut self, snap: &StateSnapshot) -> SimResult<()> {
        snap.check_shape()?;
        let known: BTreeMap<String, RegId> = persisted_registers().into_iter().collect();
        if let Some(name) = snap.registers.keys().find(|name| !known.contains_key(*name)) {
            return Err(SimError::Snapshot(format!("unknown register `{name}`")));
        }

        self.reset_state();
        for (name, value) in &snap.registers {
            if let Some(&id) = known.get(name) {
                self.regs.write(id, RegVal::new(*value))?;
            }
        }
        self.iram.copy_from_slice(&snap.iram);
        for (bank, saved) in self.lmem.iter_mut().zip(&snap.lmem) {
            bank.copy_from_slice(saved);
        }

        self.flow.newpc = self.regs.pc() as u32;
        self.flow.lc_cur = self.regs.ctrl(CtrlReg::Lc) as u32;
        self.flow.la_cur = LoopAddr::from_bits(self.regs.ctrl(CtrlReg::La) as u32);
        self.flow.lsp_cur = self.regs.ctrl(CtrlReg::Lsp) as u32;
        self.flow.psp_cur = self.regs.ctrl(CtrlReg::Psp) as u32;
        self.run_flag = self.regs.status() & STATUS_RUN != 0;
        debug!(clock = snap.clock, pc = self.flow.newpc, "snapshot restored");
        Ok(())
    }

    /// Records a snapshot for later collection by the host.
    pub(crate) fn capture_snapshot(&mut self) {
        let snap = self.snapshot();
        debug!(clock = snap.clock, "snapshot captured");
        self.snapshots.push(snap);
    }

    /// Takes every snapshot captured on `RUN`/`STOP` since the last call.
    pub fn drain_snapshots(&mut self) -> Vec<StateSnapshot> {
        std::mem::take(&mut self.snapshots)
    }
}
