//! Execution pipelines and the delayed-write scoreboard.
//!
//! The coprocessor moves every instruction through one of two staged pipes
//! and publishes every result through a time-indexed write queue:
//! 1. **Ring:** Fixed-capacity FIFO storage shared by the pipes and the host FIFO.
//! 2. **Stage:** Generic staged pipe with in-order retirement checking.
//! 3. **Cal:** Nine-stage arithmetic pipe entries.
//! 4. **Lmem:** Four-stage memory/control pipe entries.
//! 5. **Queue:** Delayed-write queue with bypass lookup.
//! 6. **Addr:** Linear, modulo and bit-reversed address arithmetic.

/// Address register arithmetic.
pub mod addr;

/// Arithmetic pipeline entries.
pub mod cal;

/// Memory pipeline entries.
pub mod lmem;

/// Delayed-write queue.
pub mod queue;

/// Fixed-capacity ring buffer.
pub mod ring;

/// Generic staged pipe.
pub mod stage;

pub use cal::{CalEntry, CalPipe};
pub use lmem::{LmemEntry, LmemPipe};
pub use queue::{DelayedWriteQueue, PendingWrite};
pub use ring::RingBuffer;
pub use stage::{Pipe, Staged};
