use k128cp2_core::isa::{HiOp, Instruction, LoOp};

/// Assembles one VLIW word from a hi and a lo operation.
///
/// Both halves default to `nop`. Hi setters place operands in the upper
/// 32 bits, lo setters in the lower 32 bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vliw {
    hi: u64,
    lo: u64,
}

impl Vliw {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Hi half ---

    /// Three-operand arithmetic `op fd, fs, ft`.
    pub fn hi(mut self, op: HiOp, fd: u64, fs: u64, ft: u64) -> Self {
        self.hi = ((op as u64) << 56) | (fd << 50) | (fs << 44) | (ft << 38);
        self
    }

    /// Fourth operand of `caddsub`-style operations.
    pub fn fq(mut self, fq: u64) -> Self {
        self.hi |= fq << 32;
        self
    }

    /// Immediate of `li*`, `addi`, `lshifti` and friends.
    pub fn imm(mut self, imm: u64) -> Self {
        self.hi |= (imm & 0x3_ffff) << 32;
        self
    }

    /// `c.cond.fmt cc1, fs, ft`.
    pub fn ccond(mut self, fmt: u64, cc1: u64, cond: u64, fs: u64, ft: u64) -> Self {
        self.hi = ((HiOp::Ccond as u64) << 56) | (fmt << 53) | (cc1 << 50) | (fs << 44) | (ft << 38) | (cond << 32);
        self
    }

    /// Predicates the word on FCCR bit `cc`.
    pub fn pred(mut self, cc: u64) -> Self {
        self.lo |= cc << 29;
        self
    }

    // --- Lo half ---

    fn lo_op(mut self, op: LoOp, fields: u64) -> Self {
        self.lo = (self.lo & (0x7 << 29)) | ((op as u64) << 23) | fields;
        self
    }

    /// `seti rN, imm16`.
    pub fn seti(self, gpr: u64, imm: u64) -> Self {
        self.lo_op(LoOp::SetI, (gpr << 17) | (imm & 0xffff))
    }

    /// `seti` into an address register class (1 = AN, 2 = NN, 3 = MN).
    pub fn seti_addr(self, class: u64, n: u64, imm: u64) -> Self {
        self.lo_op(LoOp::SetI, (class << 21) | (n << 17) | (imm & 0xffff))
    }

    /// `doi count, end`.
    pub fn doi(self, count: u64, end: u64) -> Self {
        self.lo_op(LoOp::DoI, (count << 13) | end)
    }

    /// `do rN, end`.
    pub fn do_(self, gpr: u64, end: u64) -> Self {
        self.lo_op(LoOp::Do, (gpr << 13) | end)
    }

    pub fn enddo(self) -> Self {
        self.lo_op(LoOp::EndDo, 0)
    }

    pub fn calli(self, target: u64) -> Self {
        self.lo_op(LoOp::CallI, target)
    }

    pub fn ret(self) -> Self {
        self.lo_op(LoOp::Ret, 0)
    }

    pub fn jumpi(self, target: u64) -> Self {
        self.lo_op(LoOp::JumpI, target)
    }

    pub fn stopi(self, code: u64) -> Self {
        self.lo_op(LoOp::StopI, code)
    }

    /// `run rN`.
    pub fn run(self, gpr: u64) -> Self {
        self.lo_op(LoOp::Run, gpr << 13)
    }

    /// `stop rN`.
    pub fn stop(self, gpr: u64) -> Self {
        self.lo_op(LoOp::Stop, gpr << 13)
    }

    pub fn sync(self) -> Self {
        self.lo_op(LoOp::Sync, 0)
    }

    /// `lwi fN, addr`.
    pub fn lwi(self, fpr: u64, addr: u64) -> Self {
        self.lo_op(LoOp::Lwi, (fpr << 17) | addr)
    }

    /// `ldi fN, addr`.
    pub fn ldi(self, fpr: u64, addr: u64) -> Self {
        self.lo_op(LoOp::Ldi, (fpr << 17) | addr)
    }

    /// `swi fN, addr`.
    pub fn swi(self, fpr: u64, addr: u64) -> Self {
        self.lo_op(LoOp::Swi, (fpr << 17) | addr)
    }

    /// `swnp fN, (aN)+`.
    pub fn swnp(self, fpr: u64, an: u64) -> Self {
        self.lo_op(LoOp::Swnp, (fpr << 17) | (an << 13))
    }

    /// `updaddrnp (aN)+`.
    pub fn updaddrnp(self, an: u64) -> Self {
        self.lo_op(LoOp::UpdAddrNp, an << 13)
    }

    pub fn start_dma(self) -> Self {
        self.lo_op(LoOp::StartDma, 0)
    }

    /// `check_dma rN`.
    pub fn check_dma(self, gpr: u64) -> Self {
        self.lo_op(LoOp::CheckDma, gpr << 17)
    }

    pub fn build(self) -> u64 {
        self.hi | self.lo
    }

    pub fn instruction(self) -> Instruction {
        Instruction(self.build())
    }
}

/// A word with both halves `nop`.
pub const NOP: u64 = 0;
