//! Jump, loop and call sequencing.
//!
//! Control flow runs ahead of the committed registers. The machine keeps
//! "current" copies of LSP, LC, LA and PSP that change the moment a `DO`,
//! `CALL` or `RET` executes, while the architectural registers follow a
//! clock or two later through the delayed-write queue. The stacks
//! themselves are not architectural registers and live here.
//!
//! 1. **Jumps:** At most one jump may be pending; it is taken by the next PC update.
//! 2. **Loops:** A loop ends when the PC reaches `LA.end`; the jump back to `LA.start` has one delay slot.
//! 3. **Calls:** The return address skips the delay slot after the call.
//! 4. **PC Update:** Pending jump first, then loop-end processing, then the next sequential word.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::constants::{
    CALL_MAX_DEPTH, IRAM_WORDS, LOOP_MAX_DEPTH, STACK_OVERFLOW_MARK, delay,
};
use crate::common::{CtrlReg, Origin, RegId, RegVal, SimError, SimResult};
use crate::core::arch::status::{LoopAddr, STATUS_LOE, STATUS_LUE, STATUS_POE, STATUS_PUE, STATUS_RUN};

use super::Machine;

/// One loop stack frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopFrame {
    /// Loop body bounds.
    pub la: LoopAddr,
    /// Iterations left.
    pub lc: u32,
}

/// Control-flow state that is not held in architectural registers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowState {
    /// Address of the word issued next.
    pub newpc: u32,
    /// A jump is pending.
    pub jump_flag: bool,
    /// Target of the pending jump.
    pub jump_newpc: u32,
    /// The pending jump was requested by a call.
    pub call_jump: bool,
    /// The pending jump closes a loop iteration.
    pub loop_jump: bool,
    /// The innermost loop just finished its last iteration.
    pub loop_last_it: bool,
    /// Loop stack pointer, ahead of LSP.
    pub lsp_cur: u32,
    /// Iterations left in the innermost loop, ahead of LC.
    pub lc_cur: u32,
    /// Bounds of the innermost loop, ahead of LA.
    pub la_cur: LoopAddr,
    /// Call stack pointer, ahead of PSP.
    pub psp_cur: u32,
    /// Loop frames; frame 0 is the idle frame.
    pub lstack: [LoopFrame; LOOP_MAX_DEPTH],
    /// Return addresses; entry 0 is unused.
    pub pstack: [u32; CALL_MAX_DEPTH],
}

impl FlowState {
    /// Innermost loop frame.
    fn top_frame(&mut self) -> &mut LoopFrame {
        let lsp = (self.lsp_cur as usize).min(LOOP_MAX_DEPTH - 1);
        &mut self.lstack[lsp]
    }
}

impl Machine {
    /// Requests a jump taken at the next PC update.
    ///
    /// # Arguments
    ///
    /// * `target` - IRAM address of the next word.
    ///
    /// # Returns
    ///
    /// `DoubleJump` if another jump is already pending.
    pub(crate) fn jump(&mut self, target: u32) -> SimResult<()> {
        if self.flow.jump_flag {
            return Err(SimError::DoubleJump {
                pending: self.flow.jump_newpc,
                requested: target,
            });
        }
        self.flow.jump_flag = true;
        self.flow.jump_newpc = target;
        Ok(())
    }

    /// Starts a hardware loop of `count` iterations ending at `endaddr`.
    ///
    /// A zero count skips the body and the delay slot after it. On
    /// overflow the stack keeps its depth, LOE is raised and the
    /// innermost frame is overwritten.
    pub(crate) fn loop_new(&mut self, count: u64, endaddr: u32) -> SimResult<()> {
        let count = (count & 0xffff_ffff) as u32;
        if count == 0 {
            debug!(endaddr, "zero-trip loop skipped");
            return self.jump(endaddr + 2);
        }

        self.flow.lsp_cur += 1;
        let newlsp = self.flow.lsp_cur;
        let newla = LoopAddr {
            start: self.flow.newpc,
            end: endaddr,
        };
        let committed_lsp = self.regs.ctrl(CtrlReg::Lsp) as u32;

        if committed_lsp >= STACK_OVERFLOW_MARK || newlsp as usize >= LOOP_MAX_DEPTH {
            self.flow.lsp_cur -= 1;
            warn!(lsp = committed_lsp, "loop stack overflow");
            self.set_status_bits(STATUS_LOE, STATUS_LOE)?;
            let frame = LoopFrame {
                la: self.flow.la_cur,
                lc: self.flow.lc_cur,
            };
            self.flow.lstack[newlsp as usize - 1] = frame;
        } else {
            self.flow.la_cur = newla;
            self.flow.lc_cur = count;
            self.flow.lstack[newlsp as usize] = LoopFrame { la: newla, lc: count };
            self.schedule_write(
                RegId::ctrl(CtrlReg::Lsp),
                RegVal::new(u64::from(newlsp)).from_origin(Origin::Internal),
                delay::LOOP_PUSH,
                false,
            )?;
        }

        self.schedule_write(RegId::ctrl(CtrlReg::Lc), RegVal::new(u64::from(count)), delay::LOOP_PUSH, false)?;
        self.schedule_write(
            RegId::ctrl(CtrlReg::La),
            RegVal::new(u64::from(newla.bits())),
            delay::LOOP_PUSH,
            false,
        )?;
        self.flow.lc_cur = count;
        self.flow.la_cur = newla;
        debug!(start = newla.start, end = newla.end, count, lsp = self.flow.lsp_cur, "loop push");
        self.dump_loop_stack();
        Ok(())
    }

    /// Calls `target`; the return address skips the delay slot.
    pub(crate) fn call_new(&mut self, target: u32) -> SimResult<()> {
        self.flow.psp_cur += 1;
        let newpsp = self.flow.psp_cur as usize;
        self.flow.call_jump = true;
        let ret_pc = self.flow.newpc + 1;
        let committed_psp = self.regs.ctrl(CtrlReg::Psp) as u32;

        if committed_psp >= STACK_OVERFLOW_MARK || newpsp >= CALL_MAX_DEPTH {
            self.flow.psp_cur -= 1;
            warn!(psp = committed_psp, "call stack overflow");
            self.set_status_bits(STATUS_POE, STATUS_POE)?;
            self.flow.pstack[newpsp - 1] = ret_pc;
        } else {
            self.flow.pstack[newpsp] = ret_pc;
            self.schedule_write(
                RegId::ctrl(CtrlReg::Psp),
                RegVal::new(newpsp as u64).from_origin(Origin::Internal),
                delay::FLOW,
                false,
            )?;
        }
        debug!(target, ret_pc, psp = self.flow.psp_cur, "call");
        self.jump(target)?;
        self.dump_call_stack();
        Ok(())
    }

    /// Returns from the innermost call, or raises PUE if there is none.
    pub(crate) fn call_ret(&mut self) -> SimResult<()> {
        let psp = self.flow.psp_cur;
        if psp == 0 {
            warn!("call stack underflow");
            self.set_status_bits(STATUS_PUE, STATUS_PUE)?;
        } else {
            let ret_pc = self.flow.pstack[psp as usize];
            self.jump(ret_pc)?;
            self.flow.psp_cur -= 1;
            self.schedule_write(
                RegId::ctrl(CtrlReg::Psp),
                RegVal::new(u64::from(psp - 1)).from_origin(Origin::Internal),
                delay::FLOW,
                false,
            )?;
            debug!(ret_pc, psp = self.flow.psp_cur, "return");
        }
        self.dump_call_stack();
        Ok(())
    }

    /// Leaves the innermost loop immediately.
    pub(crate) fn enddo(&mut self) -> SimResult<()> {
        if self.flow.lsp_cur == 0 {
            warn!("loop stack underflow");
            return self.set_status_bits(STATUS_LUE, STATUS_LUE);
        }
        self.flow.lsp_cur -= 1;
        let frame = self.flow.lstack[self.flow.lsp_cur as usize];
        self.flow.la_cur = frame.la;
        self.flow.lc_cur = frame.lc;
        let internal = |bits: u64| RegVal::new(bits).from_origin(Origin::Internal);
        self.commit(RegId::ctrl(CtrlReg::Lsp), internal(u64::from(self.flow.lsp_cur)))?;
        self.commit(RegId::ctrl(CtrlReg::La), internal(u64::from(frame.la.bits())))?;
        self.commit(RegId::ctrl(CtrlReg::Lc), internal(u64::from(frame.lc)))?;
        debug!(lsp = self.flow.lsp_cur, "enddo");
        self.dump_loop_stack();
        Ok(())
    }

    /// Computes and commits the PC of the next word.
    pub(crate) fn set_next_pc(&mut self) -> SimResult<()> {
        if self.flow.loop_last_it {
            let (lc, la, lsp) = (self.flow.lc_cur, self.flow.la_cur, self.flow.lsp_cur);
            self.schedule_write(RegId::ctrl(CtrlReg::Lc), RegVal::new(u64::from(lc)), delay::FLOW, false)?;
            self.schedule_write(RegId::ctrl(CtrlReg::La), RegVal::new(u64::from(la.bits())), delay::FLOW, false)?;
            self.schedule_write(
                RegId::ctrl(CtrlReg::Lsp),
                RegVal::new(u64::from(lsp)).from_origin(Origin::Internal),
                delay::FLOW,
                false,
            )?;
            self.flow.loop_last_it = false;
        }
        if self.flow.loop_jump {
            let lc = self.flow.lc_cur;
            self.schedule_write(RegId::ctrl(CtrlReg::Lc), RegVal::new(u64::from(lc)), delay::FLOW, false)?;
            self.flow.loop_jump = false;
        }
        self.flow.call_jump = false;

        let pc = if self.flow.jump_flag {
            self.flow.jump_flag = false;
            self.flow.jump_newpc
        } else {
            self.process_loop_end()?
        };

        self.commit(RegId::ctrl(CtrlReg::Pc), RegVal::new(u64::from(pc)).from_origin(Origin::Internal))?;
        self.flow.newpc = pc;

        if pc as usize >= IRAM_WORDS {
            self.halt_past_iram(pc)?;
        }
        Ok(())
    }

    /// Stops a program whose PC left IRAM.
    pub(crate) fn halt_past_iram(&mut self, pc: u32) -> SimResult<()> {
        warn!(pc, "end of iram reached");
        self.set_status_bits(0, STATUS_RUN)?;
        self.run_flag = false;
        Ok(())
    }

    /// Closes a loop iteration if the word just issued is the loop end.
    ///
    /// # Returns
    ///
    /// The sequential successor of the current word. A jump back to the
    /// loop start, if any, is left pending for the following update.
    fn process_loop_end(&mut self) -> SimResult<u32> {
        let newpc = self.flow.newpc;
        if self.flow.lsp_cur == 0 || newpc != self.flow.la_cur.end {
            return Ok(newpc + 1);
        }

        self.flow.lc_cur = self.flow.lc_cur.wrapping_sub(1);
        let lc = self.flow.lc_cur;
        self.flow.top_frame().lc = lc;

        if lc == 0 {
            self.flow.lsp_cur -= 1;
            self.flow.loop_last_it = true;
            let frame = self.flow.lstack[self.flow.lsp_cur as usize];
            self.flow.la_cur = frame.la;
            self.flow.lc_cur = frame.lc;
            debug!(lsp = self.flow.lsp_cur, "loop pop");
        } else {
            self.flow.loop_jump = true;
            let start = self.flow.la_cur.start;
            self.jump(start)?;
        }
        self.dump_loop_stack();
        Ok(newpc + 1)
    }
}
