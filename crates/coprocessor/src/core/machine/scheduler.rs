//! Per-clock scheduler.
//!
//! One call to [`Machine::clock`] advances the coprocessor by one clock:
//! 1. **Select:** Drain countdowns block issue; an idle machine executes or pre-loads a FIFO
//!    word; a running machine fetches from IRAM at the current sequencing PC.
//! 2. **Issue:** The hi operation enters the cal pipe and the lo operation either runs now or
//!    enters the lmem pipe.
//! 3. **Shift:** Cal pipe, lmem pipe, then the head slot of the delayed-write queue.
//! 4. **Sequence:** The PC is updated and the clock counter advances.

use tracing::trace;

use crate::common::constants::IRAM_WORDS;
use crate::common::{CtrlReg, RegId, SimError, SimResult};
use crate::core::arch::status::{STATUS_FE, STATUS_RUN};
use crate::core::pipeline::{CalEntry, LmemEntry};
use crate::isa::{HiOp, Instruction, LoOp};

use super::{FifoEntry, Machine};

impl Machine {
    /// Advances the machine by one clock.
    ///
    /// # Arguments
    ///
    /// * `host_cycle` - Host clock of this step; only used for tracing.
    ///
    /// # Returns
    ///
    /// A fatal error if an opcode is unassigned or a pipeline invariant
    /// breaks. The machine state is unspecified afterwards.
    pub fn clock(&mut self, host_cycle: u64) -> SimResult<()> {
        trace!(host_cycle, clock = self.clock_count(), pc = self.flow.newpc, "clock");
        self.reset_request = false;
        self.sync.tick();
        self.stop.tick();

        let update_pc = if self.sync.pending || self.stop.pending {
            self.shift()?;
            false
        } else if !self.run_flag && self.regs.status() & STATUS_FE == 0 {
            self.step_from_fifo()?
        } else if !self.run_flag {
            if !self.fifo.is_empty() {
                self.set_status_bits(0, STATUS_FE)?;
            }
            self.shift()?;
            false
        } else if self.flow.newpc as usize >= IRAM_WORDS {
            self.shift()?;
            self.halt_past_iram(self.flow.newpc)?;
            false
        } else {
            let instr = Instruction(self.iram_word(self.flow.newpc as usize)?);
            self.instr_from_fifo = false;
            self.issue(instr)?;
            self.shift()?;
            true
        };

        if self.reset_request {
            self.written.clear();
            self.regs.tick();
            return Ok(());
        }

        let draining = self.sync.pending || self.stop.pending;
        if update_pc || (self.flow.jump_flag && !self.flow.call_jump && !draining) {
            self.set_next_pc()?;
        } else if self.flow.call_jump {
            self.flow.jump_flag = false;
            self.flow.call_jump = false;
        }

        self.written.clear();
        self.regs.tick();
        Ok(())
    }

    /// Executes or pre-loads the oldest FIFO word.
    ///
    /// # Returns
    ///
    /// Whether the PC moves this clock (only for pre-loads).
    fn step_from_fifo(&mut self) -> SimResult<bool> {
        let entry = self.fifo.pop_front().unwrap_or(FifoEntry {
            instr: Instruction(0),
            ldc2: false,
        });
        self.instr_from_fifo = true;

        let update_pc = if entry.ldc2 {
            let pc = self.regs.pc() as usize;
            let slot = self.iram.get_mut(pc).ok_or(SimError::IramOutOfRange { addr: pc })?;
            *slot = entry.instr.0;
            trace!(pc, word = format_args!("{:#018x}", entry.instr.0), "ldc2 pre-load");
            true
        } else {
            self.issue(entry.instr)?;
            self.shift()?;
            false
        };

        if self.fifo.is_empty() {
            self.set_status_bits(STATUS_FE, STATUS_FE)?;
        }
        Ok(update_pc)
    }

    /// Places both halves of a VLIW word into execution.
    fn issue(&mut self, instr: Instruction) -> SimResult<()> {
        self.dump_instruction(instr);
        let now = self.clock_count();

        let hi = HiOp::try_from(instr.hi_opcode())?;
        self.cal.issue(CalEntry::new(instr, hi, now, self.nulify))?;

        let lo = LoOp::try_from(instr.lo_opcode())?;
        if lo.executes_at_issue() {
            return self.execute_at_issue(instr, lo);
        }
        self.lmem_pipe.issue(LmemEntry::new(instr, lo, now, self.nulify))?;
        self.nulify = match lo {
            LoOp::Do => self.read_with_bypass(RegId::gpr(instr.gs()))? == 0,
            LoOp::DoI => instr.cnt10() == 0,
            _ => false,
        };
        Ok(())
    }

    /// Shifts both pipes and commits the head slot of the queue.
    fn shift(&mut self) -> SimResult<()> {
        self.shift_cal()?;
        self.shift_lmem()?;
        let retired_cal = self.cal.retire()?;
        let retired_lmem = self.lmem_pipe.retire()?;
        if !retired_cal.is_empty() || !retired_lmem.is_empty() {
            trace!(?retired_cal, ?retired_lmem, "retire");
        }
        self.shift_queue()
    }

    fn shift_cal(&mut self) -> SimResult<()> {
        for pos in 0..self.cal.len() {
            let Some(mut e) = self.cal.entry(pos) else { break };
            if !e.annulled && e.stage == 1 {
                self.execute_hi(e.instr, e.op)?;
            }
            e.stage += 1;
            self.cal.store(pos, e);
        }
        Ok(())
    }

    fn shift_lmem(&mut self) -> SimResult<()> {
        for pos in 0..self.lmem_pipe.len() {
            let Some(mut e) = self.lmem_pipe.entry(pos) else { break };
            if !e.annulled {
                self.execute_lmem_stage(&mut e)?;
            }
            e.stage += 1;
            self.lmem_pipe.store(pos, e);
        }
        Ok(())
    }

    /// Commits writes due now, then looks one clock ahead for a RUN start.
    fn shift_queue(&mut self) -> SimResult<()> {
        let mut pos = 0;
        while let Some(w) = self.queue.head_entry(pos) {
            self.commit(w.id, w.val)?;
            pos += 1;
        }
        let run_next = self
            .queue
            .slot(1)
            .iter()
            .any(|w| w.id.is_ctrl(CtrlReg::Status) && w.val.bits & w.val.mask & STATUS_RUN != 0);
        if run_next && !self.run_flag {
            trace!("run flag raised");
            self.run_flag = true;
        }
        self.queue.advance();
        Ok(())
    }
}
