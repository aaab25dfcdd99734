//! Optional state dumps.
//!
//! Every dump is an `info` event under the `k128cp2::dump` target and is
//! emitted only when selected in [`DumpConfig`](crate::config::DumpConfig):
//! 1. **Instruction Trace:** One line per issued word with its source and disassembly.
//! 2. **Stop Code:** The code of every `STOP`/`STOPI`.
//! 3. **Halt Dumps:** Register files, stacks and local memory when the program stops.

use tracing::info;

use crate::common::CtrlReg;
use crate::common::constants::{NUM_ADDR_REGS, NUM_FPR, NUM_GPR, NUM_SECTIONS};
use crate::isa::Instruction;
use crate::isa::disasm::disassemble;

use super::Machine;

/// Tracing target of every dump.
pub const DUMP_TARGET: &str = "k128cp2::dump";

impl Machine {
    /// Traces an issued word.
    pub(crate) fn dump_instruction(&self, instr: Instruction) {
        if !self.config.dump.instructions {
            return;
        }
        let source = if self.instr_from_fifo {
            "fifo".to_string()
        } else {
            format!("{:04x}", self.flow.newpc)
        };
        info!(
            target: DUMP_TARGET,
            clock = self.clock_count(),
            nulify = self.nulify,
            "instdump {source} {:08x} {:08x} {}",
            instr.0 >> 32,
            instr.0 & 0xffff_ffff,
            disassemble(instr)
        );
    }

    /// Reports a stop code.
    pub(crate) fn dump_stop_code(&self, code: u64) {
        if self.config.dump.stop_code {
            info!(target: DUMP_TARGET, clock = self.clock_count(), "stop code {code:#x}");
        }
    }

    /// Emits every halt dump selected in the configuration.
    pub(crate) fn dump_halt(&self) {
        let dump = &self.config.dump;
        if dump.ctrl_regs {
            self.dump_ctrl_regs();
        }
        if dump.gpr {
            self.dump_gpr();
        }
        if dump.addr_regs {
            self.dump_addr_regs();
        }
        if dump.fpu {
            self.dump_fpu();
        }
        if dump.loop_stack {
            self.dump_loop_stack();
        }
        if dump.call_stack {
            self.dump_call_stack();
        }
        for s in (0..NUM_SECTIONS).filter(|&s| dump.lmem_sections[s]) {
            self.dump_lmem(s);
        }
    }

    /// Dumps the loop stack up to the current depth.
    pub(crate) fn dump_loop_stack(&self) {
        if !self.config.dump.loop_stack {
            return;
        }
        let depth = self.flow.lsp_cur as usize;
        for (i, frame) in self.flow.lstack.iter().enumerate().take(depth + 1).skip(1) {
            info!(
                target: DUMP_TARGET,
                "lstack[{i:2}] start={:04x} end={:04x} lc={}",
                frame.la.start,
                frame.la.end,
                frame.lc
            );
        }
        info!(target: DUMP_TARGET, lsp = depth, "loop stack");
    }

    /// Dumps the call stack up to the current depth.
    pub(crate) fn dump_call_stack(&self) {
        if !self.config.dump.call_stack {
            return;
        }
        let depth = self.flow.psp_cur as usize;
        for (i, ret) in self.flow.pstack.iter().enumerate().take(depth + 1).skip(1) {
            info!(target: DUMP_TARGET, "pstack[{i:2}] ret={ret:04x}");
        }
        info!(target: DUMP_TARGET, psp = depth, "call stack");
    }

    fn dump_ctrl_regs(&self) {
        for reg in CtrlReg::ALL {
            info!(target: DUMP_TARGET, "{:>10} = {:#010x}", reg.name(), self.regs.ctrl(reg));
        }
    }

    fn dump_gpr(&self) {
        for n in 0..NUM_GPR {
            info!(target: DUMP_TARGET, "g{n:<2} = {:016x}  ir{n:<2} = {:016x}", self.regs.gpr[n], self.regs.ireg[n]);
        }
    }

    fn dump_addr_regs(&self) {
        for n in 0..NUM_ADDR_REGS {
            info!(
                target: DUMP_TARGET,
                "a{n:<2} = {:04x}  n{n:<2} = {:04x}  m{n:<2} = {:04x}",
                self.regs.an[n],
                self.regs.nn[n],
                self.regs.mn[n]
            );
        }
    }

    fn dump_fpu(&self) {
        for (s, sec) in self.regs.sections.iter().enumerate() {
            info!(target: DUMP_TARGET, section = s, "fccr={:02x} fcsr={:05x}", sec.fccr, sec.fcsr);
        }
        for n in 0..NUM_FPR {
            let row: Vec<String> = self
                .regs
                .sections
                .iter()
                .map(|sec| format!("{:016x}", sec.fpr[n]))
                .collect();
            info!(target: DUMP_TARGET, "f{n:<2} | {} |", row.join(" | "));
        }
    }

    fn dump_lmem(&self, section: usize) {
        for (addr, word) in self.lmem[section].iter().enumerate().filter(|(_, w)| **w != 0) {
            info!(target: DUMP_TARGET, section, "{addr:04x}: {word:016x}");
        }
    }
}
