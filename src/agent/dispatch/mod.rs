//! Stage subprocess dispatch and execution.
//!
//! This module provides subprocess execution for stages with:
//!
//! - Shell-mediated command lines (pipes, redirection, quoting all work)
//! - Live forwarding of stdout/stderr while capturing both in full
//! - Environment overlay merging on top of the inherited environment
//! - Cross-platform shell selection

mod executor;
mod shell;

pub use executor::{StepOutput, execute, execute_with_sinks};
pub use shell::ShellCommand;
