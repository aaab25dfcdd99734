//! Register transfers and control flow in the lmem pipe.
//!
//! Every lo operation that is neither a memory access nor an issue-time
//! operation runs here when its entry reaches stage 1.

use tracing::debug;

use crate::common::constants::{ADDR_MASK, ADDR_MODE_LINEAR, NUM_FPR, NUM_SECTIONS, SECTION_ALL, delay};
use crate::common::{CtrlReg, RegId, RegVal, SimError, SimResult};
use crate::core::arch::status::LoopAddr;
use crate::core::machine::Machine;
use crate::isa::{Instruction, LoOp};

use super::{hi, lo, pack, predicated_off};

/// Register class codes of `MOVE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MoveClass {
    Gpr,
    Ctrl,
    An,
    Nn,
    Mn,
    Ireg,
}

impl MoveClass {
    fn decode(code: u32, field: &'static str) -> SimResult<Self> {
        match code {
            0 => Ok(Self::Gpr),
            2 => Ok(Self::Ctrl),
            3 => Ok(Self::An),
            4 => Ok(Self::Nn),
            5 => Ok(Self::Mn),
            6 => Ok(Self::Ireg),
            _ => Err(SimError::InvalidField {
                mnemonic: "move",
                field,
                value: u64::from(code),
            }),
        }
    }

    const fn is_addr(self) -> bool {
        matches!(self, Self::An | Self::Nn | Self::Mn)
    }
}

fn ctrl_reg(n: usize, mnemonic: &'static str) -> SimResult<CtrlReg> {
    CtrlReg::from_index(n as u16).ok_or(SimError::InvalidField {
        mnemonic,
        field: "ctrl",
        value: n as u64,
    })
}

fn reg_of(class: MoveClass, n: usize) -> SimResult<RegId> {
    Ok(match class {
        MoveClass::Gpr => RegId::gpr(n),
        MoveClass::Ctrl => RegId::ctrl(ctrl_reg(n, "move")?),
        MoveClass::An => RegId::addr_an(n),
        MoveClass::Nn => RegId::addr_nn(n),
        MoveClass::Mn => RegId::addr_mn(n),
        MoveClass::Ireg => RegId::ireg(n),
    })
}

impl Machine {
    /// Runs stage 1 of a non-memory lo operation.
    pub(crate) fn execute_lo(&mut self, instr: Instruction, op: LoOp) -> SimResult<()> {
        match op {
            LoOp::Move => self.exec_move(instr),
            LoOp::Clr => self.exec_clr(instr),
            LoOp::SetI => self.exec_seti(instr),
            LoOp::MtFpr => self.exec_mtfpr(instr),
            LoOp::MfFpr => self.exec_mffpr(instr),
            LoOp::CheckDma => self.exec_check_dma(instr),
            LoOp::PsPrmSgn0 => self.exec_psprmsgn(instr, 0),
            LoOp::PsPrmSgn1 => self.exec_psprmsgn(instr, NUM_FPR / 2),
            LoOp::Do => {
                let count = self.read_raw(RegId::gpr(instr.gs()))?;
                self.loop_new(count, instr.imm13())
            }
            LoOp::DoI => self.loop_new(u64::from(instr.cnt10()), instr.imm13()),
            LoOp::Call => {
                let target = self.read_raw(RegId::gpr(instr.gs()))?;
                self.call_new(target as u32)
            }
            LoOp::CallI => self.call_new(instr.imm13()),
            LoOp::Ret => self.call_ret(),
            LoOp::Jump | LoOp::JumpI if self.nulify => {
                debug!(op = op.mnemonic(), "jump ignored in annulled slot");
                Ok(())
            }
            LoOp::Jump => {
                let target = self.read_with_bypass(RegId::gpr(instr.gs()))?;
                self.jump(target as u32)
            }
            LoOp::JumpI => self.jump(instr.imm13()),
            _ => Ok(()),
        }
    }

    fn exec_move(&mut self, instr: Instruction) -> SimResult<()> {
        let src = MoveClass::decode(instr.styp(), "styp")?;
        let dst = MoveClass::decode(instr.dtyp(), "dtyp")?;
        let (dreg, sreg) = (instr.gt(), instr.gs());

        let src_id = reg_of(src, sreg)?;
        let data = match (src, src_id.as_ctrl()) {
            (MoveClass::Ireg, _) => self.read_raw(src_id)?,
            (MoveClass::Ctrl, Some(CtrlReg::Lc)) => u64::from(self.flow.lc_cur),
            (MoveClass::Ctrl, Some(CtrlReg::Lsp)) => u64::from(self.flow.lsp_cur),
            (MoveClass::Ctrl, Some(CtrlReg::La)) => u64::from(self.flow.la_cur.bits()),
            (MoveClass::Ctrl, Some(CtrlReg::Psp)) => u64::from(self.flow.psp_cur),
            _ => self.read_with_bypass(src_id)?,
        };

        let dst_id = reg_of(dst, dreg)?;
        let lsp = self.flow.lsp_cur as usize;
        let delay = match dst_id.as_ctrl() {
            Some(CtrlReg::Psp | CtrlReg::Lsp) => return Ok(()),
            Some(CtrlReg::Lc) => {
                self.flow.lc_cur = data as u32;
                if let Some(frame) = self.flow.lstack.get_mut(lsp) {
                    frame.lc = data as u32;
                }
                delay::MOVE_CTRL
            }
            Some(CtrlReg::La) => {
                let la = LoopAddr::from_bits(data as u32);
                self.flow.la_cur = la;
                if let Some(frame) = self.flow.lstack.get_mut(lsp) {
                    frame.la = la;
                }
                delay::MOVE_CTRL
            }
            Some(_) => delay::MOVE_CTRL,
            None => delay::MOVE,
        };
        let val = if dst.is_addr() {
            RegVal::masked(data, ADDR_MASK)
        } else {
            RegVal::new(data)
        };
        self.schedule_write(dst_id, val, delay, true)
    }

    /// Resets address register set `rn`: AN = 0, NN = 1, MN = linear.
    fn exec_clr(&mut self, instr: Instruction) -> SimResult<()> {
        let rn = instr.gs();
        let writes = [
            (RegId::addr_an(rn), 0),
            (RegId::addr_nn(rn), 1),
            (RegId::addr_mn(rn), u64::from(ADDR_MODE_LINEAR)),
        ];
        for (id, bits) in writes {
            self.schedule_write(id, RegVal::masked(bits, ADDR_MASK), delay::MOVE, true)?;
        }
        Ok(())
    }

    fn exec_seti(&mut self, instr: Instruction) -> SimResult<()> {
        let n = instr.gt();
        let value = u64::from(instr.imm16lo());
        let (id, val) = match instr.regtype() {
            0 => (RegId::gpr(n), RegVal::new(value)),
            1 => (RegId::addr_an(n), RegVal::masked(value, ADDR_MASK)),
            2 => (RegId::addr_nn(n), RegVal::masked(value, ADDR_MASK)),
            _ => (RegId::addr_mn(n), RegVal::masked(value, ADDR_MASK)),
        };
        self.schedule_write(id, val, delay::SETI, true)
    }

    /// Moves a GPR or index register into FPR `ft2` of one or all sections.
    fn exec_mtfpr(&mut self, instr: Instruction) -> SimResult<()> {
        let sreg = instr.gs();
        let data = if instr.mfpr() == 0 {
            self.read_with_bypass(RegId::gpr(sreg))?
        } else {
            self.read_raw(RegId::ireg(sreg))?
        };
        let sections = match instr.secn() {
            s if s < NUM_SECTIONS => s..s + 1,
            SECTION_ALL => 0..NUM_SECTIONS,
            other => {
                return Err(SimError::InvalidField {
                    mnemonic: "mtfpr",
                    field: "secn",
                    value: other as u64,
                });
            }
        };
        for s in sections {
            self.schedule_write(RegId::fpr(s, instr.ft2()), RegVal::new(data), delay::MTFPR, false)?;
        }
        Ok(())
    }

    /// Moves FPR `ft2` of one section into a GPR or index register.
    fn exec_mffpr(&mut self, instr: Instruction) -> SimResult<()> {
        let secn = instr.secn();
        if secn >= NUM_SECTIONS {
            return Err(SimError::InvalidField {
                mnemonic: "mffpr",
                field: "secn",
                value: secn as u64,
            });
        }
        let data = self.read_extended(RegId::fpr(secn, instr.ft2()))?;
        let dst = if instr.mfpr() == 0 {
            RegId::gpr(instr.gs())
        } else {
            RegId::ireg(instr.gs())
        };
        self.schedule_write(dst, RegVal::new(data), delay::MFFPR, true)
    }

    fn exec_check_dma(&mut self, instr: Instruction) -> SimResult<()> {
        let data = self.dma.as_mut().map_or(0, |dma| dma.check_dma());
        self.schedule_write(RegId::gpr(instr.gt()), RegVal::new(data), delay::CHECK_DMA, true)
    }

    /// Lane permute with sign control from `{ft, ft+1}` into `{fd, fd+1}`.
    ///
    /// Output lane `k` (fd.lo, fd.hi, fdd.lo, fdd.hi) takes source lane
    /// `sel_k` (ft.lo, ft.hi, ftt.lo, ftt.hi), sign flipped when `n_k` is set.
    fn exec_psprmsgn(&mut self, instr: Instruction, bank: usize) -> SimResult<()> {
        let ft = instr.ft2();
        let fd = instr.fd2() + bank;
        let cc = instr.cc();
        for s in 0..NUM_SECTIONS {
            if predicated_off(&self.regs, s, cc) {
                continue;
            }
            let fpr = &self.regs.sections[s].fpr;
            let (t, tt) = (fpr[ft % NUM_FPR], fpr[(ft + 1) % NUM_FPR]);
            let source = [lo(t), hi(t), lo(tt), hi(tt)];
            let lane = |k: usize| {
                let v = source[instr.sel_lane(k)];
                if instr.neg_lane(k) { v ^ 0x8000_0000 } else { v }
            };
            let d = pack(lane(1), lane(0));
            let dd = pack(lane(3), lane(2));
            self.schedule_write(RegId::fpr(s, fd % NUM_FPR), RegVal::new(d), delay::PSPRMSGN, false)?;
            self.schedule_write(RegId::fpr(s, (fd + 1) % NUM_FPR), RegVal::new(dd), delay::PSPRMSGN, false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::pipeline::PendingWrite;

    fn lo_word(op: LoOp, fields: u64) -> Instruction {
        Instruction(((op as u64) << 23) | fields)
    }

    fn pending(m: &Machine, delay: usize) -> Vec<PendingWrite> {
        m.queue.slot(delay).to_vec()
    }

    #[test]
    fn test_seti_address_register_is_masked() {
        let mut m = Machine::default();
        let i = lo_word(LoOp::SetI, (1 << 21) | (5 << 17) | 0xffff);
        m.execute_lo(i, LoOp::SetI).unwrap();
        assert_eq!(m.read_an_bypass(5).unwrap(), 0x1fff);
    }

    #[test]
    fn test_move_gpr_to_gpr_forwards() {
        let mut m = Machine::default();
        m.schedule_write(RegId::gpr(2), RegVal::new(77), 3, true).unwrap();
        let i = lo_word(LoOp::Move, (4 << 17) | (2 << 13));
        m.execute_lo(i, LoOp::Move).unwrap();
        let w = pending(&m, delay::MOVE);
        assert_eq!(w.len(), 1);
        assert_eq!((w[0].id, w[0].val.bits), (RegId::gpr(4), 77));
    }

    #[test]
    fn test_move_to_lc_updates_current_loop() {
        let mut m = Machine::default();
        m.regs.gpr[1] = 9;
        let i = lo_word(LoOp::Move, ((CtrlReg::Lc as u64) << 17) | (1 << 13) | (2 << 3));
        m.execute_lo(i, LoOp::Move).unwrap();
        assert_eq!(m.flow.lc_cur, 9);
        assert_eq!(m.flow.lstack[0].lc, 9);
        assert_eq!(pending(&m, delay::MOVE_CTRL).len(), 1);
    }

    #[test]
    fn test_move_to_stack_pointer_is_dropped() {
        let mut m = Machine::default();
        let i = lo_word(LoOp::Move, ((CtrlReg::Psp as u64) << 17) | (2 << 3));
        m.execute_lo(i, LoOp::Move).unwrap();
        assert!(m.queue.is_empty());
    }

    #[test]
    fn test_move_rejects_fpr_class() {
        let mut m = Machine::default();
        let i = lo_word(LoOp::Move, 1);
        assert!(matches!(
            m.execute_lo(i, LoOp::Move),
            Err(SimError::InvalidField { mnemonic: "move", .. })
        ));
    }

    #[test]
    fn test_clr_resets_address_set() {
        let mut m = Machine::default();
        m.execute_lo(lo_word(LoOp::Clr, 3 << 13), LoOp::Clr).unwrap();
        let w = pending(&m, delay::MOVE);
        let got: Vec<_> = w.iter().map(|p| (p.id, p.val.bits)).collect();
        assert_eq!(
            got,
            vec![(RegId::addr_an(3), 0), (RegId::addr_nn(3), 1), (RegId::addr_mn(3), 0x1fff)]
        );
    }

    #[test]
    fn test_mtfpr_broadcasts_to_all_sections() {
        let mut m = Machine::default();
        m.regs.gpr[6] = 0xabc;
        let i = lo_word(LoOp::MtFpr, (10 << 17) | (6 << 13) | SECTION_ALL as u64);
        m.execute_lo(i, LoOp::MtFpr).unwrap();
        let w = pending(&m, delay::MTFPR);
        assert_eq!(w.len(), NUM_SECTIONS);
        assert!(w.iter().all(|p| p.val.bits == 0xabc && !p.bypass));
    }

    #[test]
    fn test_mffpr_rejects_broadcast() {
        let mut m = Machine::default();
        let i = lo_word(LoOp::MfFpr, SECTION_ALL as u64);
        assert!(m.execute_lo(i, LoOp::MfFpr).is_err());
    }

    #[test]
    fn test_psprmsgn_permutes_and_negates() {
        let mut m = Machine::default();
        m.regs.sections[0].fpr[4] = pack(0x1111_1111, 0x2222_2222);
        m.regs.sections[0].fpr[5] = pack(0x3333_3333, 0x4444_4444);
        // sel = [3, 2, 1, 0], negate lane 0, fd2 = 1.
        let fields = (4 << 17) | (1 << 12) | (1 << 8) | 0b00_01_10_11;
        m.execute_lo(lo_word(LoOp::PsPrmSgn1, fields), LoOp::PsPrmSgn1).unwrap();
        let w: Vec<_> = pending(&m, delay::PSPRMSGN)
            .into_iter()
            .filter(|p| p.id.section == Some(0))
            .map(|p| (p.id.index, p.val.bits))
            .collect();
        assert_eq!(w, vec![(33, pack(0x4444_4444, 0xb333_3333)), (34, pack(0x2222_2222, 0x1111_1111))]);
    }

    #[test]
    fn test_jump_ignored_when_annulled() {
        let mut m = Machine::default();
        m.nulify = true;
        m.execute_lo(lo_word(LoOp::JumpI, 0x40), LoOp::JumpI).unwrap();
        assert!(!m.flow.jump_flag);
        m.nulify = false;
        m.execute_lo(lo_word(LoOp::JumpI, 0x40), LoOp::JumpI).unwrap();
        assert_eq!((m.flow.jump_flag, m.flow.jump_newpc), (true, 0x40));
    }
}
