//! Hi and lo opcode tables.
//!
//! Each table is an enum whose discriminants are the hardware encodings, so
//! dispatch is an exhaustive `match` and the only runtime check left is the
//! `TryFrom<u8>` conversion for bit patterns that name no operation.

use crate::common::{SimError, SimResult};

macro_rules! opcode_table {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $mnem:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code, )+
        }

        impl $name {
            /// Every operation in the table, in encoding order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Assembler mnemonic.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $( Self::$variant => $mnem, )+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = SimError;

            fn try_from(code: u8) -> SimResult<Self> {
                match code {
                    $( $code => Ok(Self::$variant), )+
                    _ => Err(SimError::$err(code)),
                }
            }
        }
    };
}

opcode_table! {
    /// Arithmetic (hi) operations, executed in stage 1 of the cal pipeline.
    HiOp, UnknownHiOpcode {
        /// No operation.
        Nop = 0x00 => "nop",
        /// Set FCCR bits from a comparison.
        Ccond = 0x02 => "c.cond",
        /// Clear an FPR.
        Clear = 0x03 => "clear",
        /// Copy an FPR.
        Copy = 0x04 => "copy",
        /// Swap the halves of an FPR.
        SwapHl = 0x05 => "swaphl",
        /// Exchange two FPRs.
        Swap64 = 0x06 => "swap64",
        /// Read the section number.
        RdSec = 0x07 => "rdsec",
        /// Load a 16-bit immediate into lane 3.
        Li3 = 0x08 => "li3",
        /// Load a 16-bit immediate into lane 2.
        Li2 = 0x09 => "li2",
        /// Load a 16-bit immediate into lane 1.
        Li1 = 0x0a => "li1",
        /// Load a 16-bit immediate into lane 0.
        Li0 = 0x0b => "li0",
        /// Move an FPU control register into an FPR.
        Mfc = 0x0e => "mfc",
        /// Move an FPR into an FPU control register.
        Mtc = 0x0f => "mtc",
        /// Complex add.
        Cadd = 0x10 => "cadd",
        /// Complex subtract.
        Csub = 0x11 => "csub",
        /// Complex add and subtract.
        CaddSub = 0x12 => "caddsub",
        /// Complex negate.
        Cneg = 0x13 => "cneg",
        /// Complex multiply.
        Cmul = 0x14 => "cmul",
        /// Complex multiply-add.
        Cmadd = 0x15 => "cmadd",
        /// Complex multiply-subtract.
        Cmsub = 0x16 => "cmsub",
        /// Multiply by i.
        Cmuli = 0x17 => "cmuli",
        /// Multiply by -i.
        Cmulni = 0x18 => "cmulni",
        /// Complex conjugate.
        Cconj = 0x19 => "cconj",
        /// FFT butterfly with a generated twiddle.
        Cfly = 0x1a => "cfly",
        /// FFT butterfly with a register twiddle.
        Cfly2 = 0x1b => "cfly2",
        /// Multiply by the conjugate.
        Chmul = 0x1c => "chmul",
        /// Multiply-add by the conjugate.
        Chmadd = 0x1d => "chmadd",
        /// Multiply-subtract by the conjugate.
        Chmsub = 0x1e => "chmsub",
        /// Packed-single add.
        PsAdd = 0x20 => "psadd",
        /// Packed-single subtract.
        PsSub = 0x21 => "pssub",
        /// Packed-single add and subtract.
        PsAddSub = 0x22 => "psaddsub",
        /// Packed-single negate.
        PsNeg = 0x23 => "psneg",
        /// Packed-single multiply.
        PsMul = 0x24 => "psmul",
        /// Packed-single multiply-add.
        PsMadd = 0x25 => "psmadd",
        /// Packed-single multiply-subtract.
        PsMsub = 0x26 => "psmsub",
        /// Packed-single absolute value.
        PsAbs = 0x27 => "psabs",
        /// Matrix-vector multiply.
        MvMul = 0x28 => "mvmul",
        /// Transposed matrix-vector multiply.
        MtvMul = 0x29 => "mtvmul",
        /// Matrix-vector multiply-add.
        MvMadd = 0x2a => "mvmadd",
        /// Transposed matrix-vector multiply-add.
        MtvMadd = 0x2b => "mtvmadd",
        /// Matrix-vector multiply-subtract.
        MvMsub = 0x2c => "mvmsub",
        /// Transposed matrix-vector multiply-subtract.
        MtvMsub = 0x2d => "mtvmsub",
        /// 2x2 transpose.
        MTrans = 0x2e => "mtrans",
        /// Four-term dot product.
        QsDot = 0x2f => "qsdot",
        /// Packed-single copy sign.
        PsCopySign = 0x30 => "pscopysign",
        /// Packed-single exponent extraction.
        PsGetExp = 0x31 => "psgetexp",
        /// Packed-single mantissa extraction.
        PsGetMan = 0x32 => "psgetman",
        /// Packed-single scale by a power of two.
        PsScale = 0x33 => "psscale",
        /// Generate a twiddle coefficient.
        GetCoeff = 0x34 => "getcoeff",
        /// Packed-word add.
        Add = 0x40 => "add",
        /// Packed-word subtract.
        Sub = 0x41 => "sub",
        /// Packed-word absolute value.
        Abs = 0x42 => "abs",
        /// Packed-word negate.
        Neg = 0x43 => "neg",
        /// Packed-word add immediate.
        AddI = 0x44 => "addi",
        /// Packed-word subtract immediate.
        SubI = 0x45 => "subi",
        /// Increment the low word.
        IncI = 0x46 => "inci",
        /// Decrement the low word.
        DecI = 0x47 => "deci",
        /// Bitwise and.
        And = 0x48 => "and",
        /// Bitwise or.
        Or = 0x49 => "or",
        /// Bitwise xor.
        Xor = 0x4a => "xor",
        /// Bitwise not.
        Not = 0x4b => "not",
        /// Packed-word logical shift by register.
        LShift = 0x4c => "lshift",
        /// Packed-word logical shift by immediate.
        LShiftI = 0x4d => "lshifti",
        /// Packed-word arithmetic shift by register.
        AShift = 0x4e => "ashift",
        /// Packed-word arithmetic shift by immediate.
        AShiftI = 0x4f => "ashifti",
        /// Packed words to packed singles.
        PwToPs = 0x58 => "pwtops",
        /// Packed singles to packed words.
        PsToPw = 0x59 => "pstopw",
        /// Spread bytes into 16-bit lanes.
        Split8 = 0x5a => "split8",
        /// Spread 16-bit lanes into words.
        Split16 = 0x5b => "split16",
        /// Spread words into two registers.
        Split32 = 0x5c => "split32",
        /// Sign-extend bytes to 16-bit lanes.
        ExtSign8H = 0x5d => "extsign8h",
        /// Sign-extend bytes to words.
        ExtSign8W = 0x5e => "extsign8w",
        /// Sign-extend 16-bit lanes to words.
        ExtSign16W = 0x5f => "extsign16w",
        /// Pack 16-bit lanes into bytes.
        Join8 = 0x60 => "join8",
        /// Pack words into 16-bit lanes.
        Join16 = 0x61 => "join16",
        /// Pack two words into one register.
        Join32 = 0x62 => "join32",
        /// Convert four 16-bit integers to singles.
        Unpck16WsToPs = 0x63 => "unpck16wstops",
        /// Reciprocal.
        Recip = 0x70 => "recip",
        /// sin(pi*x/2)/x.
        Sinc = 0x71 => "sinc",
        /// (2/pi)*atan(x)/x.
        Atanc = 0x72 => "atanc",
        /// log2(x)/(x-1).
        Log2c = 0x73 => "log2c",
        /// 2^x.
        Exp2 = 0x74 => "exp2",
        /// 1/sqrt(x).
        Rsqrt = 0x75 => "rsqrt",
        /// Range reduction for cos and sin of one argument.
        RrCosSin = 0x78 => "rrcossin",
        /// Range reduction for sin.
        RrSin = 0x79 => "rrsin",
        /// Range reduction for cos.
        RrCos = 0x7a => "rrcos",
        /// Range reduction for log2.
        RrLog2 = 0x7b => "rrlog2",
    }
}

opcode_table! {
    /// Memory and control (lo) operations.
    LoOp, UnknownLoOpcode {
        /// No operation.
        Nop = 0x00 => "nop",
        /// Register move between classes.
        Move = 0x01 => "move",
        /// Reset an address register triple.
        Clr = 0x02 => "clr",
        /// Return from call.
        Ret = 0x03 => "ret",
        /// Leave the innermost hardware loop.
        EndDo = 0x04 => "enddo",
        /// Drain the pipelines.
        Sync = 0x05 => "sync",
        /// Stop with an immediate code.
        StopI = 0x08 => "stopi",
        /// Stop with a register code.
        Stop = 0x09 => "stop",
        /// Start at an immediate address.
        RunI = 0x0a => "runi",
        /// Start at a register address.
        Run = 0x0b => "run",
        /// Load word, immediate address.
        Lwi = 0x10 => "lwi",
        /// Load word, register plus offset.
        Lwo = 0x11 => "lwo",
        /// Load word, post-increment.
        Lwnp = 0x12 => "lwnp",
        /// Load word, post-decrement.
        Lwnm = 0x13 => "lwnm",
        /// Store word, immediate address.
        Swi = 0x14 => "swi",
        /// Store word, register plus offset.
        Swo = 0x15 => "swo",
        /// Store word, post-increment.
        Swnp = 0x16 => "swnp",
        /// Store word, post-decrement.
        Swnm = 0x17 => "swnm",
        /// Load double, immediate address.
        Ldi = 0x18 => "ldi",
        /// Load double, register plus offset.
        Ldo = 0x19 => "ldo",
        /// Load double, post-increment.
        Ldnp = 0x1a => "ldnp",
        /// Load double, post-decrement.
        Ldnm = 0x1b => "ldnm",
        /// Store double, immediate address.
        Sdi = 0x1c => "sdi",
        /// Store double, register plus offset.
        Sdo = 0x1d => "sdo",
        /// Store double, post-increment.
        Sdnp = 0x1e => "sdnp",
        /// Store double, post-decrement.
        Sdnm = 0x1f => "sdnm",
        /// Set a register to an immediate.
        SetI = 0x20 => "seti",
        /// Add an offset to an address register.
        UpdAddr = 0x21 => "updaddr",
        /// Add the step register to an address register.
        UpdAddrNp = 0x22 => "updaddrnp",
        /// Subtract the step register from an address register.
        UpdAddrNm = 0x23 => "updaddrnm",
        /// Hardware loop with an immediate count.
        DoI = 0x24 => "doi",
        /// Hardware loop with a register count.
        Do = 0x25 => "do",
        /// Call an immediate address.
        CallI = 0x26 => "calli",
        /// Call a register address.
        Call = 0x27 => "call",
        /// Jump to an immediate address.
        JumpI = 0x28 => "jumpi",
        /// Jump to a register address.
        Jump = 0x29 => "jump",
        /// Query the DMA controller.
        CheckDma = 0x2e => "check_dma",
        /// Signal the DMA controller.
        StartDma = 0x2f => "start_dma",
        /// Move a GPR or index register into an FPR.
        MtFpr = 0x30 => "mtfpr",
        /// Move an FPR into a GPR or index register.
        MfFpr = 0x31 => "mffpr",
        /// Lane permute with sign control, low FPR bank.
        PsPrmSgn0 = 0x32 => "psprmsgn0",
        /// Lane permute with sign control, high FPR bank.
        PsPrmSgn1 = 0x33 => "psprmsgn1",
    }
}

/// Direction of a memory-pipeline access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessClass {
    /// Local memory to FPR.
    Load,
    /// FPR to local memory.
    Store,
    /// Address register update only.
    UpdateAddr,
}

/// Effective-address computation of a memory-pipeline access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddrMode {
    /// Address taken from the 13-bit immediate.
    Imm,
    /// AN, then AN += NN.
    PostInc,
    /// AN, then AN -= NN.
    PostDec,
    /// AN, then AN += signed offset.
    Offset,
}

/// Width of a memory-pipeline access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSize {
    /// One 64-bit word per section.
    Word,
    /// Two 64-bit words per section, even-aligned.
    Dword,
}

/// Decoded parameters of a load, store or address update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemAccess {
    /// Access direction.
    pub class: AccessClass,
    /// Address computation.
    pub mode: AddrMode,
    /// Access width.
    pub size: DataSize,
    /// Whether the access writes back the updated address register.
    pub updates_an: bool,
}

impl MemAccess {
    const fn new(class: AccessClass, mode: AddrMode, size: DataSize) -> Self {
        Self {
            class,
            mode,
            size,
            updates_an: !matches!(mode, AddrMode::Imm),
        }
    }
}

impl HiOp {
    /// Returns true if the operation reports floating-point exceptions through FCSR.
    pub const fn updates_fcsr(self) -> bool {
        !matches!(
            self,
            Self::Nop
                | Self::Clear
                | Self::SwapHl
                | Self::Swap64
                | Self::MTrans
                | Self::RdSec
                | Self::Li0
                | Self::Li1
                | Self::Li2
                | Self::Li3
                | Self::LShift
                | Self::LShiftI
                | Self::AShift
                | Self::AShiftI
                | Self::Split8
                | Self::Split16
                | Self::Split32
                | Self::Join8
                | Self::Join16
                | Self::Join32
                | Self::ExtSign8H
                | Self::ExtSign8W
                | Self::ExtSign16W
                | Self::Copy
                | Self::Add
                | Self::Sub
                | Self::Abs
                | Self::Neg
                | Self::AddI
                | Self::SubI
                | Self::IncI
                | Self::DecI
                | Self::And
                | Self::Or
                | Self::Xor
                | Self::Not
                | Self::Ccond
                | Self::Mfc
                | Self::Mtc
                | Self::GetCoeff
        )
    }
}

impl LoOp {
    /// Returns true if the operation takes effect at issue instead of entering the lmem pipe.
    pub const fn executes_at_issue(self) -> bool {
        matches!(
            self,
            Self::Run | Self::RunI | Self::EndDo | Self::Stop | Self::StopI | Self::Sync | Self::StartDma
        )
    }

    /// Memory-pipeline parameters, or `None` for operations handled entirely in stage 1.
    pub const fn mem_access(self) -> Option<MemAccess> {
        use AccessClass::{Load, Store, UpdateAddr};
        use AddrMode::{Imm, Offset, PostDec, PostInc};
        use DataSize::{Dword, Word};
        let access = match self {
            Self::Lwi => MemAccess::new(Load, Imm, Word),
            Self::Lwo => MemAccess::new(Load, Offset, Word),
            Self::Lwnp => MemAccess::new(Load, PostInc, Word),
            Self::Lwnm => MemAccess::new(Load, PostDec, Word),
            Self::Swi => MemAccess::new(Store, Imm, Word),
            Self::Swo => MemAccess::new(Store, Offset, Word),
            Self::Swnp => MemAccess::new(Store, PostInc, Word),
            Self::Swnm => MemAccess::new(Store, PostDec, Word),
            Self::Ldi => MemAccess::new(Load, Imm, Dword),
            Self::Ldo => MemAccess::new(Load, Offset, Dword),
            Self::Ldnp => MemAccess::new(Load, PostInc, Dword),
            Self::Ldnm => MemAccess::new(Load, PostDec, Dword),
            Self::Sdi => MemAccess::new(Store, Imm, Dword),
            Self::Sdo => MemAccess::new(Store, Offset, Dword),
            Self::Sdnp => MemAccess::new(Store, PostInc, Dword),
            Self::Sdnm => MemAccess::new(Store, PostDec, Dword),
            Self::UpdAddr => MemAccess::new(UpdateAddr, Offset, Word),
            Self::UpdAddrNp => MemAccess::new(UpdateAddr, PostInc, Word),
            Self::UpdAddrNm => MemAccess::new(UpdateAddr, PostDec, Word),
            _ => return None,
        };
        Some(access)
    }
}
