//! Common types and constants shared by every part of the coprocessor model.
//!
//! This module provides the building blocks that the pipelines, the register
//! file and the host boundary all agree on. It includes:
//! 1. **Constants:** Machine geometry, pipeline depths, result latencies and register masks.
//! 2. **Error Handling:** The fatal `SimError` taxonomy and the `SimResult` alias.
//! 3. **Register Identifiers:** Pure `RegId` values and masked `RegVal` write payloads.

/// Machine geometry, latencies and masks.
pub mod constants;

/// Fatal simulator errors.
pub mod error;

/// Register identifiers and write payloads.
pub mod reg;

pub use error::{SimError, SimResult};
pub use reg::{CtrlReg, Half, Origin, RegId, RegKind, RegVal};
