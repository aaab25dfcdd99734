//! Register identifiers and write payloads.
//!
//! A `RegId` names a piece of register storage without owning it; the
//! register file is the only owner. A `RegVal` is what travels through the
//! delayed-write queue: raw bits, the mask of bits that may change, and the
//! origin used by the COMM handshake.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::{ADDR_MASK, NO_MASK};

/// Storage class of a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegKind {
    /// General-purpose register (64-bit).
    Gpr,
    /// Floating-point register pair of one section (hi and lo 32-bit lanes).
    Fpr,
    /// Address register.
    AddrAn,
    /// Address step register.
    AddrNn,
    /// Address modulo mask register.
    AddrMn,
    /// Control register; the index is a [`CtrlReg`] number.
    Ctrl,
    /// Floating-point condition code register of one section.
    Fccr,
    /// Floating-point control/status register of one section.
    Fcsr,
    /// Index register (64-bit).
    Ireg,
}

/// Lane selector for FPR writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    /// Whole 64-bit register.
    #[default]
    Both,
    /// Bits 63:32.
    Hi,
    /// Bits 31:0.
    Lo,
}

/// Control register numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CtrlReg {
    /// Program counter.
    Pc = 0,
    /// Host mailbox.
    Comm = 1,
    /// Control register (rounding mode, stop, reset).
    Control = 2,
    /// Status register.
    Status = 3,
    /// Call stack pointer.
    Psp = 4,
    /// Loop counter.
    Lc = 5,
    /// Loop addresses (start in 28:16, end in 12:0).
    La = 6,
    /// Loop stack pointer.
    Lsp = 7,
    /// Twiddle index.
    Rind = 8,
    /// Twiddle index step.
    Rstep = 9,
    /// Twiddle index modulo mask.
    Rmask = 10,
    /// Code written by the last `STOP`/`STOPI`.
    StopCode = 11,
    /// Free-running clock counter.
    ClockCount = 0x100,
}

impl CtrlReg {
    /// Every control register, in numbering order.
    pub const ALL: [Self; 13] = [
        Self::Pc,
        Self::Comm,
        Self::Control,
        Self::Status,
        Self::Psp,
        Self::Lc,
        Self::La,
        Self::Lsp,
        Self::Rind,
        Self::Rstep,
        Self::Rmask,
        Self::StopCode,
        Self::ClockCount,
    ];

    /// Looks up a control register by number.
    pub fn from_index(index: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|r| *r as u16 == index)
    }

    /// Lower-case register name used by dumps and snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::Comm => "comm",
            Self::Control => "control",
            Self::Status => "status",
            Self::Psp => "psp",
            Self::Lc => "lc",
            Self::La => "la",
            Self::Lsp => "lsp",
            Self::Rind => "rind",
            Self::Rstep => "rstep",
            Self::Rmask => "rmask",
            Self::StopCode => "stopcode",
            Self::ClockCount => "clockcount",
        }
    }
}

/// Identifies one register (or one lane of an FPR).
///
/// `section` is `None` for registers shared by all sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegId {
    /// Owning section for per-section registers.
    pub section: Option<u8>,
    /// Storage class.
    pub kind: RegKind,
    /// Register number within its class.
    pub index: u16,
    /// Lane selector (meaningful for FPR writes only).
    pub half: Half,
}

impl RegId {
    const fn shared(kind: RegKind, index: usize) -> Self {
        Self {
            section: None,
            kind,
            index: index as u16,
            half: Half::Both,
        }
    }

    /// General-purpose register `n`.
    pub const fn gpr(n: usize) -> Self {
        Self::shared(RegKind::Gpr, n)
    }

    /// Index register `n`.
    pub const fn ireg(n: usize) -> Self {
        Self::shared(RegKind::Ireg, n)
    }

    /// Address register AN`n`.
    pub const fn addr_an(n: usize) -> Self {
        Self::shared(RegKind::AddrAn, n)
    }

    /// Address step register NN`n`.
    pub const fn addr_nn(n: usize) -> Self {
        Self::shared(RegKind::AddrNn, n)
    }

    /// Address mode register MN`n`.
    pub const fn addr_mn(n: usize) -> Self {
        Self::shared(RegKind::AddrMn, n)
    }

    /// Control register `reg`.
    pub const fn ctrl(reg: CtrlReg) -> Self {
        Self::shared(RegKind::Ctrl, reg as usize)
    }

    /// Whole FPR `n` of `section`.
    pub const fn fpr(section: usize, n: usize) -> Self {
        Self::fpr_half(section, n, Half::Both)
    }

    /// One lane of FPR `n` of `section`.
    pub const fn fpr_half(section: usize, n: usize, half: Half) -> Self {
        Self {
            section: Some(section as u8),
            kind: RegKind::Fpr,
            index: n as u16,
            half,
        }
    }

    /// FCCR of `section`.
    pub const fn fccr(section: usize) -> Self {
        Self {
            section: Some(section as u8),
            kind: RegKind::Fccr,
            index: 0,
            half: Half::Both,
        }
    }

    /// FCSR of `section`.
    pub const fn fcsr(section: usize) -> Self {
        Self {
            section: Some(section as u8),
            kind: RegKind::Fcsr,
            index: 0,
            half: Half::Both,
        }
    }

    /// Returns true if both identifiers name the same storage, ignoring the lane.
    pub fn same_register(&self, other: &Self) -> bool {
        self.section == other.section && self.kind == other.kind && self.index == other.index
    }

    /// Returns true if this names control register `reg`.
    pub fn is_ctrl(&self, reg: CtrlReg) -> bool {
        self.kind == RegKind::Ctrl && self.index == reg as u16
    }

    /// The control register this identifier names, if any.
    pub fn as_ctrl(&self) -> Option<CtrlReg> {
        if self.kind == RegKind::Ctrl {
            CtrlReg::from_index(self.index)
        } else {
            None
        }
    }

    /// Mask applied to full-width writes of this register by `MOVE`/`SETI`.
    pub const fn natural_mask(&self) -> u64 {
        match self.kind {
            RegKind::AddrAn | RegKind::AddrNn | RegKind::AddrMn => ADDR_MASK,
            _ => NO_MASK,
        }
    }
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sect = self.section.map(|s| format!("s{s}.")).unwrap_or_default();
        let half = match self.half {
            Half::Both => "",
            Half::Hi => ".hi",
            Half::Lo => ".lo",
        };
        match self.kind {
            RegKind::Gpr => write!(f, "r{}", self.index),
            RegKind::Ireg => write!(f, "i{}", self.index),
            RegKind::AddrAn => write!(f, "a{}", self.index),
            RegKind::AddrNn => write!(f, "n{}", self.index),
            RegKind::AddrMn => write!(f, "m{}", self.index),
            RegKind::Fpr => write!(f, "{sect}f{}{half}", self.index),
            RegKind::Fccr => write!(f, "{sect}fccr"),
            RegKind::Fcsr => write!(f, "{sect}fcsr"),
            RegKind::Ctrl => match CtrlReg::from_index(self.index) {
                Some(reg) => f.write_str(reg.name()),
                None => write!(f, "ctrl{}", self.index),
            },
        }
    }
}

/// Who produced a register write.
///
/// Only COMM writes and reads care; every other register ignores the tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// The coprocessor itself.
    #[default]
    Cp2,
    /// The host processor.
    Host,
    /// Internal bookkeeping with no handshake meaning.
    Internal,
}

/// A register write payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegVal {
    /// Raw bits to write.
    pub bits: u64,
    /// Bits of the destination that take `bits`; the rest are preserved.
    pub mask: u64,
    /// Producer of the write.
    pub origin: Origin,
}

impl RegVal {
    /// Full-width write from the coprocessor.
    pub const fn new(bits: u64) -> Self {
        Self {
            bits,
            mask: NO_MASK,
            origin: Origin::Cp2,
        }
    }

    /// Masked write from the coprocessor.
    pub const fn masked(bits: u64, mask: u64) -> Self {
        Self {
            bits,
            mask,
            origin: Origin::Cp2,
        }
    }

    /// Returns the same write tagged with another origin.
    pub const fn from_origin(self, origin: Origin) -> Self {
        Self { origin, ..self }
    }

    /// Applies this write to `old`, keeping bits outside the mask.
    pub const fn apply(&self, old: u64) -> u64 {
        (old & !self.mask) | (self.bits & self.mask)
    }
}
