//! `C.COND`, `MFC` and `MTC`.

use std::cmp::Ordering;

use crate::common::constants::{FCCR_MASK, FCSR_MASK, delay};
use crate::common::{RegId, RegVal, SimError, SimResult};
use crate::isa::Instruction;

use super::{Lanes, hi, lo};

/// `cntrlreg` value selecting FCSR.
const CNTRLREG_FCSR: u32 = 0;
/// `cntrlreg` value selecting FCCR.
const CNTRLREG_FCCR: u32 = 1;

/// Operand format of `C.COND`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Single,
    Word,
    PairedSingle,
    PairedWord,
}

impl Format {
    const fn from_bits(fmt: u32) -> Self {
        match fmt & 0x3 {
            0 => Self::Single,
            1 => Self::Word,
            2 => Self::PairedSingle,
            _ => Self::PairedWord,
        }
    }

    const fn is_paired(self) -> bool {
        matches!(self, Self::PairedSingle | Self::PairedWord)
    }

    const fn is_float(self) -> bool {
        matches!(self, Self::Single | Self::PairedSingle)
    }
}

/// Evaluates condition `cond` (T, UN, LT, LE, EQ, NE, GT, GE) on an ordering.
///
/// `None` means the operands were unordered.
pub(crate) const fn evaluate(cond: u32, ord: Option<Ordering>) -> bool {
    let nan = ord.is_none();
    let less = matches!(ord, Some(Ordering::Less));
    let equal = matches!(ord, Some(Ordering::Equal));
    match cond & 0x7 {
        0 => true,
        1 => nan,
        2 => less,
        3 => less || equal,
        4 => equal,
        5 => !equal,
        6 => !less && !equal && !nan,
        _ => !less && !nan,
    }
}

/// Compares two lanes in `fmt`.
fn compare(l: &Lanes<'_>, fmt: Format, a: u32, b: u32) -> Option<Ordering> {
    if fmt.is_float() {
        l.fpu.compare(a, b)
    } else {
        Some((a as i32).cmp(&(b as i32)))
    }
}

/// Sets FCCR bit `cc1` (and `cc1 + 1` for paired formats) from a comparison of `fs` and `ft`.
pub(crate) fn ccond(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let fmt = Format::from_bits(i.fmt());
    let cc = i.cc1();
    let cond = i.cond();
    let (s, t) = if fmt.is_float() {
        (l.operand(i.fs()), l.operand(i.ft()))
    } else {
        (l.raw(i.fs()), l.raw(i.ft()))
    };

    let mut fccr = l.fccr();
    let mut mask = 0u64;
    let mut set = |bit: u32, value: bool| {
        fccr = (fccr & !(1 << bit)) | (u64::from(value) << bit);
        mask |= 1 << bit;
    };
    set(cc, evaluate(cond, compare(l, fmt, lo(s), lo(t))));
    if fmt.is_paired() {
        set(cc + 1, evaluate(cond, compare(l, fmt, hi(s), hi(t))));
    }

    let id = RegId::fccr(l.section());
    l.write(id, RegVal::masked(fccr | 1, mask & FCCR_MASK), delay::CCOND, false);
    Ok(())
}

/// Moves FCSR or FCCR into `fd.lo`.
pub(crate) fn mfc(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let value = match i.cntrlreg() {
        CNTRLREG_FCSR => l.fcsr(),
        CNTRLREG_FCCR => l.fccr(),
        other => {
            return Err(SimError::InvalidField {
                mnemonic: "mfc",
                field: "cntrlreg",
                value: u64::from(other),
            });
        }
    };
    let id = RegId::fpr(l.section(), i.fd());
    l.write(id, RegVal::new(u64::from(lo(value))), delay::MFC, false);
    Ok(())
}

/// Moves `fd.lo` into FCSR or FCCR.
///
/// An FCSR write also contributes its flag bits to STATUS.fpe, which the
/// section driver writes once all sections ran.
pub(crate) fn mtc(l: &mut Lanes<'_>, i: Instruction) -> SimResult<()> {
    let data = u64::from(lo(l.raw(i.fd())));
    let (id, val) = match i.cntrlreg() {
        CNTRLREG_FCSR => {
            l.accumulate_status_fpe((data & 0xfc) << 14);
            (RegId::fcsr(l.section()), RegVal::masked(data, FCSR_MASK))
        }
        CNTRLREG_FCCR => (RegId::fccr(l.section()), RegVal::masked(data | 1, FCCR_MASK)),
        other => {
            return Err(SimError::InvalidField {
                mnemonic: "mtc",
                field: "cntrlreg",
                value: u64::from(other),
            });
        }
    };
    l.write(id, val, delay::MTC, true);
    Ok(())
}
