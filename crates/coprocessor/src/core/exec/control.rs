//! Run, stop, sync and the other issue-time lo operations.
//!
//! These operations bypass the lmem pipe: they take effect in the clock the
//! word issues, before the pipes shift.

use tracing::{debug, info};

use crate::common::constants::{DRAIN_CLOCKS, delay};
use crate::common::{CtrlReg, Origin, RegId, RegVal, SimResult};
use crate::core::arch::status::{CONTROL_ST, STATUS_RUN};
use crate::core::machine::Machine;
use crate::isa::{Instruction, LoOp};

impl Machine {
    /// Executes an issue-time lo operation.
    ///
    /// # Arguments
    ///
    /// * `instr` - Issued word.
    /// * `op` - Its lo operation; [`LoOp::executes_at_issue`] must hold.
    pub(crate) fn execute_at_issue(&mut self, instr: Instruction, op: LoOp) -> SimResult<()> {
        match op {
            LoOp::Run | LoOp::RunI => self.exec_run(instr, op),
            LoOp::Stop | LoOp::StopI => self.exec_stop(instr, op),
            LoOp::Sync => {
                debug!("sync");
                self.sync.start(DRAIN_CLOCKS);
                Ok(())
            }
            LoOp::StartDma => {
                debug!("start_dma");
                self.start_dma = true;
                Ok(())
            }
            LoOp::EndDo => self.enddo(),
            _ => Ok(()),
        }
    }

    /// Starts the program at the operand address unless a stop is requested.
    fn exec_run(&mut self, instr: Instruction, op: LoOp) -> SimResult<()> {
        if self.regs.control() & CONTROL_ST != 0 {
            debug!("run ignored while CONTROL.st is set");
            return Ok(());
        }
        let target = if op == LoOp::Run {
            (self.read_raw(RegId::gpr(instr.gs()))? & 0xffff) as u32
        } else {
            instr.imm13()
        };
        self.jump(target)?;
        self.schedule_write(
            RegId::ctrl(CtrlReg::Status),
            RegVal::masked(STATUS_RUN, STATUS_RUN),
            delay::RUN_STOP,
            false,
        )?;
        info!(target, "run");
        if self.config.snapshot.on_run {
            self.capture_snapshot();
        }
        Ok(())
    }

    /// Halts the program and records its stop code.
    fn exec_stop(&mut self, instr: Instruction, op: LoOp) -> SimResult<()> {
        self.request_stop()?;
        let code = if op == LoOp::Stop {
            self.read_raw(RegId::gpr(instr.gs()))?
        } else {
            u64::from(instr.imm13())
        };
        self.commit(
            RegId::ctrl(CtrlReg::StopCode),
            RegVal::new(code).from_origin(Origin::Internal),
        )?;
        info!(code, "stop");
        self.dump_stop_code(code);
        self.dump_halt();
        if self.config.snapshot.on_stop {
            self.capture_snapshot();
        }
        Ok(())
    }
}
