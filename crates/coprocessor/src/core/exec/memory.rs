//! Local memory pipe stages.
//!
//! Loads, stores and address updates run a fixed stage plan; every other lo
//! operation in the pipe only has a stage-1 handler. Address register,
//! memory and FPR writes made here commit immediately rather than through
//! the delayed-write queue.

use tracing::trace;

use crate::common::constants::{ADDR_MASK, NUM_FPR, NUM_SECTIONS};
use crate::common::{Origin, RegId, RegVal, SimResult};
use crate::core::machine::Machine;
use crate::core::pipeline::LmemEntry;
use crate::core::pipeline::addr::adjust_addr;
use crate::isa::{AccessClass, AddrMode, DataSize, MemAccess};

/// Local memory words touched by an access at `addr`.
fn words(size: DataSize, addr: u32) -> [usize; 2] {
    let addr = addr as usize;
    match size {
        DataSize::Word => [addr, addr],
        DataSize::Dword => [addr & !1, (addr & !1) + 1],
    }
}

impl Machine {
    /// Runs the current stage of an lmem entry.
    ///
    /// The caller advances the stage counter and stores the entry back.
    pub(crate) fn execute_lmem_stage(&mut self, e: &mut LmemEntry) -> SimResult<()> {
        let Some(access) = e.access else {
            return if e.stage == 1 { self.execute_lo(e.instr, e.op) } else { Ok(()) };
        };
        match (access.class, e.stage) {
            (_, 1) => {
                self.stage_address(e, access)?;
                if access.class == AccessClass::Store {
                    self.stage_read_fpr(e, access.size)?;
                }
                Ok(())
            }
            (AccessClass::Load, 2) => {
                self.stage_read_mem(e, access.size)?;
                self.stage_write_an(e, access)
            }
            (AccessClass::Load, 3) => self.stage_write_fpr(e, access.size),
            (AccessClass::Store, 2) => {
                self.stage_write_an(e, access)?;
                self.stage_write_mem(e, access.size)
            }
            (AccessClass::UpdateAddr, 2) => self.stage_write_an(e, access),
            _ => Ok(()),
        }
    }

    /// Computes the effective address and the post-update AN value.
    ///
    /// The access uses AN as it was before the update; only immediate
    /// accesses take their address from the instruction.
    fn stage_address(&mut self, e: &mut LmemEntry, access: MemAccess) -> SimResult<()> {
        if access.mode == AddrMode::Imm {
            return Ok(());
        }
        let rn = e.rn;
        let addr = self.read_an_bypass(rn)?;
        let mode = self.read_with_bypass(RegId::addr_mn(rn))? as u32;
        let offs = match access.mode {
            AddrMode::PostInc => self.read_with_bypass(RegId::addr_nn(rn))? as i32,
            AddrMode::PostDec => -(self.read_with_bypass(RegId::addr_nn(rn))? as i32),
            _ => e.offset,
        };
        e.addr = addr;
        e.an_new = adjust_addr(addr, offs, mode) & ADDR_MASK as u32;
        trace!(op = e.op.mnemonic(), rn, addr, an_new = e.an_new, "lmem address");
        Ok(())
    }

    fn stage_write_an(&mut self, e: &LmemEntry, access: MemAccess) -> SimResult<()> {
        if !access.updates_an {
            return Ok(());
        }
        let val = RegVal::masked(u64::from(e.an_new), ADDR_MASK).from_origin(Origin::Internal);
        self.commit(RegId::addr_an(e.rn), val)
    }

    fn stage_read_mem(&mut self, e: &mut LmemEntry, size: DataSize) -> SimResult<()> {
        let [a0, a1] = words(size, e.addr);
        for s in 0..NUM_SECTIONS {
            e.data[s] = [self.lmem_word(s, a0)?, self.lmem_word(s, a1)?];
        }
        Ok(())
    }

    fn stage_write_mem(&mut self, e: &LmemEntry, size: DataSize) -> SimResult<()> {
        let [a0, a1] = words(size, e.addr);
        for s in 0..NUM_SECTIONS {
            self.set_lmem_word(s, a0, e.data[s][0])?;
            if size == DataSize::Dword {
                self.set_lmem_word(s, a1, e.data[s][1])?;
            }
        }
        Ok(())
    }

    /// Captures store data as the FPRs held it at the start of this clock.
    fn stage_read_fpr(&self, e: &mut LmemEntry, size: DataSize) -> SimResult<()> {
        for s in 0..NUM_SECTIONS {
            e.data[s][0] = self.read_extended(RegId::fpr(s, e.fpr % NUM_FPR))?;
            if size == DataSize::Dword {
                e.data[s][1] = self.read_extended(RegId::fpr(s, (e.fpr + 1) % NUM_FPR))?;
            }
        }
        Ok(())
    }

    fn stage_write_fpr(&mut self, e: &LmemEntry, size: DataSize) -> SimResult<()> {
        for s in 0..NUM_SECTIONS {
            let internal = |bits| RegVal::new(bits).from_origin(Origin::Internal);
            self.commit(RegId::fpr(s, e.fpr % NUM_FPR), internal(e.data[s][0]))?;
            if size == DataSize::Dword {
                self.commit(RegId::fpr(s, (e.fpr + 1) % NUM_FPR), internal(e.data[s][1]))?;
            }
        }
        Ok(())
    }
}
