//! VLIW instruction word and field extraction.
//!
//! A k128cp2 instruction is one 64-bit word carrying two independent
//! operations: the hi (arithmetic) operation in bits 63:32 and the lo
//! (memory/control) operation in bits 31:0. Field extraction is table
//! driven: every argument lives at a fixed `(start, len)` position and is
//! pulled out by [`Instruction::field`]. The typed accessors below are thin
//! wrappers over that table, one per argument shape.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a bit field inside the 64-bit instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Lowest bit of the field.
    pub start: u32,
    /// Width in bits.
    pub len: u32,
}

impl Field {
    const fn at(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// Mask of the field's width, right-aligned.
    pub const fn mask(self) -> u64 {
        (1u64 << self.len) - 1
    }
}

/// Field table. Hi-operation fields sit in bits 63:32, lo-operation fields in bits 31:0.
pub mod fields {
    use super::Field;

    /// Hi opcode.
    pub const OPCODE: Field = Field::at(56, 8);
    /// Hi destination FPR.
    pub const FD: Field = Field::at(50, 6);
    /// Hi first source FPR.
    pub const FS: Field = Field::at(44, 6);
    /// Hi second source FPR.
    pub const FT: Field = Field::at(38, 6);
    /// Hi second destination FPR.
    pub const FQ: Field = Field::at(32, 6);
    /// 6-bit shift immediate.
    pub const IMM6: Field = Field::at(32, 6);
    /// 12-bit arithmetic immediate.
    pub const IMM12: Field = Field::at(32, 12);
    /// 16-bit lane immediate.
    pub const IMM16: Field = Field::at(32, 16);
    /// 18-bit increment immediate.
    pub const IMM18: Field = Field::at(32, 18);
    /// `CCOND` operand format.
    pub const FMT: Field = Field::at(53, 2);
    /// `CCOND` destination condition bit.
    pub const CC1: Field = Field::at(50, 3);
    /// `CCOND` condition.
    pub const COND: Field = Field::at(32, 3);
    /// `MFC`/`MTC` FPU control register selector.
    pub const CNTRLREG: Field = Field::at(32, 4);
    /// Hi/lo lane selector.
    pub const HILO: Field = Field::at(43, 1);
    /// `QSDOT` destination lane.
    pub const MODE: Field = Field::at(32, 1);
    /// Elementary-function lane routing.
    pub const ELF_COND: Field = Field::at(32, 2);

    /// Predication condition bit.
    pub const CC: Field = Field::at(29, 3);
    /// Lo opcode.
    pub const OPCODE2: Field = Field::at(23, 6);
    /// `SETI` destination register class.
    pub const REGTYPE: Field = Field::at(21, 2);
    /// Lo FPR operand.
    pub const FT2: Field = Field::at(17, 6);
    /// Lo 4-bit register at 20:17 (gt, rn2, dreg).
    pub const GT: Field = Field::at(17, 4);
    /// Lo 4-bit register at 16:13 (gs, gr, rn, sreg).
    pub const GS: Field = Field::at(13, 4);
    /// Loop count immediate.
    pub const CNT10: Field = Field::at(13, 10);
    /// `PSPRMSGN` destination FPR (5 bits, bank selected by the opcode).
    pub const FD2: Field = Field::at(12, 5);
    /// 13-bit address immediate.
    pub const IMM13: Field = Field::at(0, 13);
    /// 16-bit `SETI` immediate.
    pub const IMM16LO: Field = Field::at(0, 16);
    /// Signed 13-bit address offset.
    pub const OFFSET13: Field = Field::at(0, 13);
    /// `MOVE` destination register class.
    pub const DTYP: Field = Field::at(3, 3);
    /// `MOVE` source register class; also `MTFPR`/`MFFPR` section number.
    pub const STYP: Field = Field::at(0, 3);
    /// `MTFPR`/`MFFPR` GPR/IREG selector.
    pub const MFPR: Field = Field::at(3, 1);
}

/// One 64-bit VLIW instruction word.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instruction(pub u64);

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction({:#018x})", self.0)
    }
}

impl From<u64> for Instruction {
    fn from(word: u64) -> Self {
        Self(word)
    }
}

impl Instruction {
    /// Extracts a raw field.
    #[inline]
    pub const fn field(self, f: Field) -> u64 {
        (self.0 >> f.start) & f.mask()
    }

    /// Extracts a field and sign-extends it from its width.
    #[inline]
    pub const fn signed_field(self, f: Field) -> i64 {
        let shift = 64 - f.len;
        ((self.field(f) << shift) as i64) >> shift
    }

    /// Raw hi opcode byte.
    pub const fn hi_opcode(self) -> u8 {
        self.field(fields::OPCODE) as u8
    }

    /// Raw lo opcode.
    pub const fn lo_opcode(self) -> u8 {
        self.field(fields::OPCODE2) as u8
    }

    /// Destination FPR of the hi operation.
    pub const fn fd(self) -> usize {
        self.field(fields::FD) as usize
    }

    /// First source FPR of the hi operation.
    pub const fn fs(self) -> usize {
        self.field(fields::FS) as usize
    }

    /// Second source FPR of the hi operation.
    pub const fn ft(self) -> usize {
        self.field(fields::FT) as usize
    }

    /// Second destination FPR of the hi operation.
    pub const fn fq(self) -> usize {
        self.field(fields::FQ) as usize
    }

    /// Signed 6-bit shift amount.
    pub const fn imm6(self) -> i32 {
        self.signed_field(fields::IMM6) as i32
    }

    /// Sign-extended 12-bit immediate.
    pub const fn imm12(self) -> i32 {
        self.signed_field(fields::IMM12) as i32
    }

    /// Unsigned 16-bit immediate of the hi operation.
    pub const fn imm16(self) -> u32 {
        self.field(fields::IMM16) as u32
    }

    /// Sign-extended 18-bit immediate.
    pub const fn imm18(self) -> i32 {
        self.signed_field(fields::IMM18) as i32
    }

    /// `CCOND` operand format.
    pub const fn fmt(self) -> u32 {
        self.field(fields::FMT) as u32
    }

    /// `CCOND` destination condition bit.
    pub const fn cc1(self) -> u32 {
        self.field(fields::CC1) as u32
    }

    /// `CCOND` condition.
    pub const fn cond(self) -> u32 {
        self.field(fields::COND) as u32
    }

    /// `MFC`/`MTC` register selector.
    pub const fn cntrlreg(self) -> u32 {
        self.field(fields::CNTRLREG) as u32
    }

    /// `QSDOT` destination lane.
    pub const fn mode(self) -> u32 {
        self.field(fields::MODE) as u32
    }

    /// Elementary-function lane routing.
    pub const fn elf_cond(self) -> u32 {
        self.field(fields::ELF_COND) as u32
    }

    /// Predication condition bit; 0 means unpredicated.
    pub const fn cc(self) -> u32 {
        self.field(fields::CC) as u32
    }

    /// `SETI` destination register class.
    pub const fn regtype(self) -> u32 {
        self.field(fields::REGTYPE) as u32
    }

    /// Lo FPR operand.
    pub const fn ft2(self) -> usize {
        self.field(fields::FT2) as usize
    }

    /// Lo register at 20:17 (gt, rn2, dreg).
    pub const fn gt(self) -> usize {
        self.field(fields::GT) as usize
    }

    /// Lo register at 16:13 (gs, gr, rn, sreg).
    pub const fn gs(self) -> usize {
        self.field(fields::GS) as usize
    }

    /// Loop count immediate.
    pub const fn cnt10(self) -> u32 {
        self.field(fields::CNT10) as u32
    }

    /// `PSPRMSGN` destination FPR (within its bank).
    pub const fn fd2(self) -> usize {
        self.field(fields::FD2) as usize
    }

    /// Unsigned 13-bit immediate.
    pub const fn imm13(self) -> u32 {
        self.field(fields::IMM13) as u32
    }

    /// Unsigned 16-bit `SETI` immediate.
    pub const fn imm16lo(self) -> u32 {
        self.field(fields::IMM16LO) as u32
    }

    /// Signed 13-bit address offset.
    pub const fn offset13(self) -> i32 {
        self.signed_field(fields::OFFSET13) as i32
    }

    /// `MOVE` destination class.
    pub const fn dtyp(self) -> u32 {
        self.field(fields::DTYP) as u32
    }

    /// `MOVE` source class.
    pub const fn styp(self) -> u32 {
        self.field(fields::STYP) as u32
    }

    /// `MTFPR`/`MFFPR` section number (4 broadcasts).
    pub const fn secn(self) -> usize {
        self.field(fields::STYP) as usize
    }

    /// `MTFPR`/`MFFPR` selector: 0 GPR, 1 index register.
    pub const fn mfpr(self) -> u32 {
        self.field(fields::MFPR) as u32
    }

    /// `PSPRMSGN` negate flag for output lane `k` (0..4).
    pub const fn neg_lane(self, k: usize) -> bool {
        (self.0 >> (8 + k)) & 1 != 0
    }

    /// `PSPRMSGN` source selector for output lane `k` (0..4).
    pub const fn sel_lane(self, k: usize) -> usize {
        ((self.0 >> (2 * k)) & 0x3) as usize
    }

    /// Returns the word with the lo operation replaced.
    pub const fn with_lo(self, lo: u32) -> Self {
        Self((self.0 & 0xffff_ffff_0000_0000) | lo as u64)
    }

    /// Returns the word with the hi operation replaced.
    pub const fn with_hi(self, hi: u32) -> Self {
        Self((self.0 & 0xffff_ffff) | ((hi as u64) << 32))
    }
}
