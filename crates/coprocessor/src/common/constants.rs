//! Machine geometry, pipeline depths, result latencies and register masks.
//!
//! Every number the hardware fixes lives here so that the pipelines, the
//! register file and the host boundary agree on them. The values come from
//! the k128cp2 reference timing model and must not be tuned.

/// Number of parallel SIMD sections.
pub const NUM_SECTIONS: usize = 4;

/// Pseudo section number used by `MTFPR` to broadcast into every section.
pub const SECTION_ALL: usize = 4;

/// Floating-point registers per section.
pub const NUM_FPR: usize = 64;

/// General-purpose registers.
pub const NUM_GPR: usize = 16;

/// Address registers of each kind (AN, NN, MN).
pub const NUM_ADDR_REGS: usize = 16;

/// Index registers.
pub const NUM_IREG: usize = 16;

/// Instruction memory size in 64-bit words.
pub const IRAM_WORDS: usize = 8192;

/// Local memory size per section in 64-bit words.
pub const LMEM_WORDS: usize = 8192;

/// Number of slots in the delayed-write queue.
pub const QUEUE_SLOTS: usize = 20;

/// Maximum number of pending writes in one queue slot.
pub const QUEUE_SLOT_ENTRIES: usize = 20;

/// Largest delay scanned by bypass lookups.
pub const BYPASS_MAX_DELAY: usize = 8;

/// Arithmetic pipeline depth; an entry retires when its stage reaches this value.
pub const CAL_STAGES: u8 = 9;

/// Memory pipeline depth; an entry retires when its stage reaches this value.
pub const LMEM_STAGES: u8 = 4;

/// Loop stack frames.
pub const LOOP_MAX_DEPTH: usize = 16;

/// Call stack frames.
pub const CALL_MAX_DEPTH: usize = 16;

/// Committed LSP/PSP value at which a further push overflows.
pub const STACK_OVERFLOW_MARK: u32 = 15;

/// Host instruction FIFO capacity.
pub const HOST_FIFO_CAPACITY: usize = 4;

/// Clocks a `SYNC` or `STOP` keeps the machine draining.
pub const DRAIN_CLOCKS: u32 = 7;

/// Mask applied to address register writes.
pub const ADDR_MASK: u64 = 0x1fff;

/// Mask applied to RIND/RSTEP/RMASK writes.
pub const RIND_MASK: u64 = 0xffff;

/// Writable FCCR bits.
pub const FCCR_MASK: u64 = 0xff;

/// Writable FCSR bits (flags and cause fields).
pub const FCSR_MASK: u64 = 0x3f0fc;

/// Full 64-bit write mask.
pub const NO_MASK: u64 = u64::MAX;

/// Address register mode selecting linear (non-modulo) arithmetic.
pub const ADDR_MODE_LINEAR: u32 = 0x1fff;

/// Address register mode selecting bit-reversed arithmetic.
pub const ADDR_MODE_BITREV: u32 = 0;

/// Result latencies, in clocks after stage 1, of each write class.
pub mod delay {
    /// Floating-point and integer arithmetic results.
    pub const FPU: usize = 7;
    /// FCSR cause/flag updates.
    pub const FCSR: usize = 6;
    /// `MOVE` into a non-control register.
    pub const MOVE: usize = 1;
    /// `MOVE` into a control register.
    pub const MOVE_CTRL: usize = 0;
    /// `MTFPR` into the floating-point register file.
    pub const MTFPR: usize = 2;
    /// `MFFPR` into a GPR or index register.
    pub const MFFPR: usize = 1;
    /// `SETI` and `CLR`.
    pub const SETI: usize = 1;
    /// `MFC` result.
    pub const MFC: usize = 7;
    /// `MTC` result.
    pub const MTC: usize = 6;
    /// `CCOND` result.
    pub const CCOND: usize = 6;
    /// STATUS.RUN set or clear after `RUN`/`STOP`.
    pub const RUN_STOP: usize = 2;
    /// `CHECK_DMA` result.
    pub const CHECK_DMA: usize = 1;
    /// `PSPRMSGN0`/`PSPRMSGN1` result.
    pub const PSPRMSGN: usize = 2;
    /// Loop register writes from `DO`/`DOI`.
    pub const LOOP_PUSH: usize = 2;
    /// Loop and call register writes on loop exit, loop jump, call and return.
    pub const FLOW: usize = 1;
    /// COMM handshake status update.
    pub const COMM: usize = 1;
}
