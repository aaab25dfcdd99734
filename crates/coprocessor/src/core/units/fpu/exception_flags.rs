//! Floating-point exception flags.
//!
//! The coprocessor tracks six exception conditions. The same 6-bit vector
//! appears in three places at different offsets:
//!
//! | Bit | Flag | Description         | FCSR flags | FCSR cause | STATUS.fpe |
//! |-----|------|---------------------|------------|------------|------------|
//! |  0  | NX   | Inexact             | 2          | 12         | 16         |
//! |  1  | UF   | Underflow           | 3          | 13         | 17         |
//! |  2  | OF   | Overflow            | 4          | 14         | 18         |
//! |  3  | DZ   | Divide by Zero      | 5          | 15         | 19         |
//! |  4  | NV   | Invalid Operation   | 6          | 16         | 20         |
//! |  5  | DN   | Denormal Operand    | 7          | 17         | 21         |

use std::ops::{BitOr, BitOrAssign};

use crate::core::arch::status::{FCSR_CAUSE_SHIFT, FCSR_FLAGS_SHIFT, STATUS_FPE_SHIFT};

/// Floating-point exception flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpFlags(u8);

impl FpFlags {
    /// No exceptions raised.
    pub const NONE: Self = Self(0);
    /// Inexact.
    pub const NX: Self = Self(1 << 0);
    /// Underflow.
    pub const UF: Self = Self(1 << 1);
    /// Overflow.
    pub const OF: Self = Self(1 << 2);
    /// Divide by Zero.
    pub const DZ: Self = Self(1 << 3);
    /// Invalid Operation.
    pub const NV: Self = Self(1 << 4);
    /// Denormal operand.
    pub const DN: Self = Self(1 << 5);

    /// Builds a flag set from the low six bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x3f)
    }

    /// Returns the raw 6-bit flag value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flags are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the specified flag is set.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Applies the invalid-operation screen: once NV is raised only NV and DN survive.
    pub const fn screened(self) -> Self {
        if self.contains(Self::NV) {
            Self(self.0 & (Self::NV.0 | Self::DN.0))
        } else {
            self
        }
    }

    /// Position of the flags in the FCSR accumulated field.
    pub const fn fcsr_flags(self) -> u64 {
        (self.0 as u64) << FCSR_FLAGS_SHIFT
    }

    /// Position of the flags in the FCSR cause field.
    pub const fn fcsr_cause(self) -> u64 {
        (self.0 as u64) << FCSR_CAUSE_SHIFT
    }

    /// Position of the flags in STATUS.fpe.
    pub const fn status_fpe(self) -> u64 {
        (self.0 as u64) << STATUS_FPE_SHIFT
    }
}

impl BitOr for FpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FpFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
