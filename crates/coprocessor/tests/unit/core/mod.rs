/// Arithmetic pipe results, predication and exception flags.
pub mod arithmetic;

/// Delayed-write queue and bypass forwarding.
pub mod bypass;

/// Hardware loops, calls and jumps.
pub mod control_flow;

/// Host register, FIFO, memory and DMA access.
pub mod host;

/// Pipe ordering and address arithmetic properties.
pub mod pipeline;

/// State snapshots.
pub mod snapshot;
