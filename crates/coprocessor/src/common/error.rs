//! Fatal simulator errors.
//!
//! The coprocessor distinguishes three classes of abnormal condition:
//! 1. **Fatal:** Decode-table or pipeline-sizing violations. These surface as `SimError`
//!    and unwind with `?` to the host boundary; the machine state is unspecified afterwards.
//! 2. **Sticky:** Guest-visible stack overflow/underflow and FIFO overflow. These are STATUS
//!    bits, never errors.
//! 3. **Arithmetic:** Floating-point exceptions accumulate into FCSR and STATUS.fpe.

use thiserror::Error;

use super::reg::RegId;

/// Result alias used throughout the simulator.
pub type SimResult<T> = Result<T, SimError>;

/// A fatal condition that aborts simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The hi (arithmetic) opcode byte is not assigned.
    #[error("unknown hi opcode 0x{0:02x}")]
    UnknownHiOpcode(u8),

    /// The lo (memory/control) opcode is not assigned.
    #[error("unknown lo opcode 0x{0:02x}")]
    UnknownLoOpcode(u8),

    /// An instruction field holds a value the operation does not accept.
    #[error("{mnemonic}: invalid {field} value {value}")]
    InvalidField {
        /// Mnemonic of the offending instruction.
        mnemonic: &'static str,
        /// Name of the field.
        field: &'static str,
        /// Raw field value.
        value: u64,
    },

    /// More writes were scheduled into one queue slot than it can hold.
    #[error("delayed-write queue slot overflow (delay {delay})")]
    QueueSlotOverflow {
        /// Requested delay.
        delay: usize,
    },

    /// A pipeline ring buffer was pushed while full.
    #[error("{pipe} pipeline overflow")]
    PipelineOverflow {
        /// Pipeline name.
        pipe: &'static str,
    },

    /// An entry other than the oldest finished its last stage.
    #[error("{pipe} pipeline: entry {index} finished before older entries")]
    PipelineOrder {
        /// Pipeline name.
        pipe: &'static str,
        /// Position of the entry that finished.
        index: usize,
    },

    /// A second jump was requested before the first one was taken.
    #[error("jump to 0x{requested:04x} requested while jump to 0x{pending:04x} is pending")]
    DoubleJump {
        /// Target already pending.
        pending: u32,
        /// Newly requested target.
        requested: u32,
    },

    /// Two forwarding paths offered a value for the same address register.
    #[error("bypass conflict on {reg}")]
    BypassConflict {
        /// Register with conflicting forwarded values.
        reg: RegId,
    },

    /// A register identifier does not name existing storage.
    #[error("invalid register {0}")]
    InvalidRegister(RegId),

    /// Local memory access outside the section or address range.
    #[error("lmem access out of range: section {section}, address 0x{addr:04x}")]
    LmemOutOfRange {
        /// Section number.
        section: usize,
        /// Word address.
        addr: usize,
    },

    /// Instruction memory access outside the address range.
    #[error("iram access out of range: address 0x{addr:04x}")]
    IramOutOfRange {
        /// Word address.
        addr: usize,
    },

    /// The host addressed a register it cannot reach.
    #[error("register {0} is not accessible from the host")]
    InvalidHostRegister(u32),

    /// The host queried an unsupported condition code.
    #[error("unsupported host condition code {0}")]
    InvalidCondCode(u32),

    /// A FIFO pop was attempted on an empty FIFO.
    #[error("instruction fifo is empty")]
    EmptyFifo,

    /// A state snapshot could not be encoded, decoded or applied.
    #[error("snapshot: {0}")]
    Snapshot(String),

    /// File access failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(err.to_string())
    }
}
