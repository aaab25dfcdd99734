/// Configuration files.
pub mod config;

/// Program image loading.
pub mod loader;

/// Run loop outcomes.
pub mod run;
