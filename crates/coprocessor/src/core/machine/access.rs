//! Register reads, bypass lookups and the commit path.
//!
//! Every register mutation funnels through [`Machine::commit`], whether it
//! comes from the delayed-write queue, an immediate pipeline-stage write or
//! the host. Reads come in four flavors:
//! 1. **Raw:** The committed register-file value.
//! 2. **Bypass:** The newest pending bypassable queue write, else raw.
//! 3. **Extended:** The value a register held at the start of this clock.
//! 4. **Address bypass:** AN forwarding from both the lmem pipe and the queue.

use tracing::{debug, trace};

use crate::common::constants::{LMEM_WORDS, NUM_SECTIONS, delay};
use crate::common::{CtrlReg, Origin, RegId, RegVal, SimError, SimResult};
use crate::core::arch::status::{CONTROL_RS, CONTROL_ST, STATUS_COMMCP2, STATUS_COMMK64, STATUS_RUN};

use super::Machine;

impl Machine {
    /// Reads the committed value of a register.
    pub fn read_raw(&self, id: RegId) -> SimResult<u64> {
        self.regs.read(id)
    }

    /// Reads a register through the forwarding network without side effects.
    ///
    /// # Returns
    ///
    /// The raw bits of the newest pending bypassable write to `id`, or the
    /// committed value if no such write is pending.
    pub fn bypass_value(&self, id: RegId) -> SimResult<u64> {
        match self.queue.bypass_lookup(id) {
            Some(pending) => Ok(pending.val.bits),
            None => self.read_raw(id),
        }
    }

    /// Reads a register through the forwarding network as the coprocessor.
    ///
    /// Reading COMM acknowledges the host's message.
    pub fn read_with_bypass(&mut self, id: RegId) -> SimResult<u64> {
        let value = self.bypass_value(id)?;
        self.comm_read_handshake(id, Origin::Cp2)?;
        Ok(value)
    }

    /// Reads the value `id` held before any write committed this clock.
    pub fn read_extended(&self, id: RegId) -> SimResult<u64> {
        match self.written.iter().find(|(w, _)| w.same_register(&id)) {
            Some((_, before)) => Ok(*before),
            None => self.read_raw(id),
        }
    }

    /// Reads address register AN`rn` with forwarding from the lmem pipe and the queue.
    ///
    /// An older lmem entry that has just written AN`rn` (stage 3 next) and a
    /// pending bypassable queue write to the same register must not both
    /// offer a value.
    pub fn read_an_bypass(&self, rn: usize) -> SimResult<u32> {
        let youngest = self.lmem_pipe.len().saturating_sub(1);
        let from_pipe = self.lmem_pipe.iter().take(youngest).find_map(|e| {
            let updates = e.access.is_some_and(|a| a.updates_an);
            (e.rn == rn && updates && e.stage == 3 && !e.annulled).then_some(e.an_new)
        });
        let id = RegId::addr_an(rn);
        let from_queue = self
            .queue
            .bypass_lookup(id)
            .map(|w| (w.val.bits & w.val.mask) as u32);
        match (from_pipe, from_queue) {
            (Some(_), Some(_)) => Err(SimError::BypassConflict { reg: id }),
            (Some(v), None) | (None, Some(v)) => Ok(v),
            (None, None) => Ok(self.read_raw(id)? as u32),
        }
    }

    /// Schedules a write `delay` clocks ahead.
    pub fn schedule_write(&mut self, id: RegId, val: RegVal, delay: usize, bypass: bool) -> SimResult<()> {
        let now = self.clock_count();
        self.queue.schedule(id, val, delay, bypass, now)
    }

    /// Commits a write to the register file with all of its side effects.
    ///
    /// The value before the write is logged for [`Machine::read_extended`].
    /// CONTROL writes may request a reset (RS) or a stop (ST). The reset
    /// empties pipelines, queue, FIFO and stacks like [`Machine::reset`] but
    /// keeps the CONTROL value just written. COMM writes raise the handshake
    /// flag of the receiving side.
    pub fn commit(&mut self, id: RegId, val: RegVal) -> SimResult<()> {
        let before = self.read_raw(id)?;
        self.written.push((id, before));
        self.regs.write(id, val)?;
        trace!(reg = %id, bits = format_args!("{:#x}", val.bits), mask = format_args!("{:#x}", val.mask), "commit");

        match id.as_ctrl() {
            Some(CtrlReg::Control) => {
                if val.bits & CONTROL_RS != 0 {
                    self.reset_state();
                    self.regs.write(id, val)?;
                    self.reset_request = true;
                    debug!("control reset");
                }
                if val.bits & CONTROL_ST != 0 {
                    self.request_stop()?;
                    self.schedule_write(
                        RegId::ctrl(CtrlReg::Control),
                        RegVal::masked(0, CONTROL_ST),
                        delay::RUN_STOP,
                        false,
                    )?;
                }
            }
            Some(CtrlReg::Comm) => {
                let flag = match val.origin {
                    Origin::Cp2 => STATUS_COMMCP2,
                    Origin::Host => STATUS_COMMK64,
                    Origin::Internal => return Err(SimError::InvalidRegister(id)),
                };
                self.schedule_write(
                    RegId::ctrl(CtrlReg::Status),
                    RegVal::masked(flag, flag).from_origin(val.origin),
                    delay::COMM,
                    false,
                )?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Commits a masked STATUS update immediately.
    pub(crate) fn set_status_bits(&mut self, bits: u64, mask: u64) -> SimResult<()> {
        self.commit(RegId::ctrl(CtrlReg::Status), RegVal::masked(bits, mask))
    }

    /// Starts the seven-clock stop drain and schedules STATUS.RUN to clear.
    pub(crate) fn request_stop(&mut self) -> SimResult<()> {
        self.stop.start(crate::common::constants::DRAIN_CLOCKS);
        self.run_flag = false;
        self.schedule_write(
            RegId::ctrl(CtrlReg::Status),
            RegVal::masked(0, STATUS_RUN),
            delay::RUN_STOP,
            false,
        )
    }

    /// Clears the sender's COMM flag after a read of COMM.
    pub(crate) fn comm_read_handshake(&mut self, id: RegId, reader: Origin) -> SimResult<()> {
        if !id.is_ctrl(CtrlReg::Comm) {
            return Ok(());
        }
        let status = RegId::ctrl(CtrlReg::Status);
        match reader {
            Origin::Cp2 => self.schedule_write(status, RegVal::masked(0, STATUS_COMMK64), delay::COMM, false),
            Origin::Host => self.schedule_write(
                status,
                RegVal::masked(0, STATUS_COMMCP2).from_origin(Origin::Host),
                0,
                false,
            ),
            Origin::Internal => Err(SimError::InvalidRegister(id)),
        }
    }

    /// Reads one local memory word.
    pub(crate) fn lmem_word(&self, section: usize, addr: usize) -> SimResult<u64> {
        self.lmem
            .get(section)
            .and_then(|bank| bank.get(addr))
            .copied()
            .ok_or(SimError::LmemOutOfRange { section, addr })
    }

    /// Writes one local memory word.
    pub(crate) fn set_lmem_word(&mut self, section: usize, addr: usize, word: u64) -> SimResult<()> {
        if section >= NUM_SECTIONS || addr >= LMEM_WORDS {
            return Err(SimError::LmemOutOfRange { section, addr });
        }
        self.lmem[section][addr] = word;
        Ok(())
    }

    /// Reads one IRAM word.
    pub(crate) fn iram_word(&self, addr: usize) -> SimResult<u64> {
        self.iram.get(addr).copied().ok_or(SimError::IramOutOfRange { addr })
    }
}
