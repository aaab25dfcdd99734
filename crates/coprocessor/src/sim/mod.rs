//! Simulation utilities and program loading.
//!
//! Provides the program image loader and a run loop that drives a
//! [`Machine`](crate::Machine) the way a host would: load IRAM, start the
//! program through the FIFO and clock until it stops.

pub mod loader;
pub mod simulator;

pub use simulator::{RunOutcome, Simulator};
