/// Fluent instruction word builders.
pub mod builder;

/// Machine setup and clocking helpers.
pub mod harness;

/// Mocked host collaborators.
pub mod mocks;
