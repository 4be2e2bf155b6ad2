//! Runner configuration.
//!
//! Settings come from two layers:
//!
//! - an optional YAML runner file (`--config`), modelled by [`RunnerConfig`]
//! - command-line flags, which override the file field by field
//!
//! The merged [`RunnerConfig`] is then validated into an immutable
//! [`RunSettings`] before the first step runs.

mod model;
mod operations;
mod settings;


// Re-export public API
pub use model::RunnerConfig;
pub use settings::RunSettings;
