//! Error types for the rw-runner CLI.
//!
//! Uses thiserror for derive macros. Every variant renders as a single
//! `RUNNER_*` reason line so that a parent process (or a nested runner) can
//! parse the failure class without scraping prose.

use crate::exit_codes;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for runner operations.
///
/// Each variant maps to a specific exit code. None of them are retried.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A stage has no command template (or an empty one).
    #[error("RUNNER_TEMPLATE_MISSING agent={agent}")]
    TemplateMissing { agent: String },

    /// The start agent is not a runnable stage.
    #[error("RUNNER_INVALID_START value={value}")]
    InvalidStart { value: String },

    /// The step ceiling is outside 1..=100.
    #[error("RUNNER_INVALID_MAX_STEPS value={value} expected=1..100")]
    InvalidMaxSteps { value: i64 },

    /// The runner config file could not be read, parsed, or validated.
    #[error("RUNNER_CONFIG_INVALID path={} message={message}", .path.display())]
    ConfigInvalid { path: PathBuf, message: String },

    /// Unrecognized flag or malformed value on the command line.
    #[error("RUNNER_INVALID_ARG message={0}")]
    InvalidArg(String),

    /// A stage command exited non-zero. Its log has already been written.
    #[error("RUNNER_CHILD_EXIT_NONZERO code={code} agent={agent}")]
    ChildExitNonzero { code: i32, agent: String },

    /// A stage command exited cleanly but named no valid next agent.
    #[error("RUNNER_NEXT_COMMAND_MISSING agent={agent}")]
    NextCommandMissing { agent: String },

    /// The step ceiling was reached before `done`.
    #[error("RUNNER_MAX_STEPS_REACHED max_steps={max_steps}")]
    MaxStepsReached { max_steps: u32 },

    /// Anything else (filesystem, spawn, report output).
    #[error("RUNNER_UNEXPECTED_ERROR message={0}")]
    Unexpected(String),
}

impl RunnerError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::TemplateMissing { .. }
            | RunnerError::InvalidStart { .. }
            | RunnerError::InvalidMaxSteps { .. }
            | RunnerError::ConfigInvalid { .. }
            | RunnerError::InvalidArg(_) => exit_codes::USER_ERROR,
            RunnerError::ChildExitNonzero { .. } => exit_codes::CHILD_FAILURE,
            RunnerError::NextCommandMissing { .. } => exit_codes::MISSING_DIRECTIVE,
            RunnerError::MaxStepsReached { .. } => exit_codes::BUDGET_EXHAUSTED,
            RunnerError::Unexpected(_) => exit_codes::UNEXPECTED,
        }
    }

    /// The bare reason code (`RUNNER_*`) without its fields.
    pub fn reason(&self) -> &'static str {
        match self {
            RunnerError::TemplateMissing { .. } => "RUNNER_TEMPLATE_MISSING",
            RunnerError::InvalidStart { .. } => "RUNNER_INVALID_START",
            RunnerError::InvalidMaxSteps { .. } => "RUNNER_INVALID_MAX_STEPS",
            RunnerError::ConfigInvalid { .. } => "RUNNER_CONFIG_INVALID",
            RunnerError::InvalidArg(_) => "RUNNER_INVALID_ARG",
            RunnerError::ChildExitNonzero { .. } => "RUNNER_CHILD_EXIT_NONZERO",
            RunnerError::NextCommandMissing { .. } => "RUNNER_NEXT_COMMAND_MISSING",
            RunnerError::MaxStepsReached { .. } => "RUNNER_MAX_STEPS_REACHED",
            RunnerError::Unexpected(_) => "RUNNER_UNEXPECTED_ERROR",
        }
    }

    /// Build an unexpected-error from an I/O failure on a path.
    pub fn io(action: &str, path: &Path, err: std::io::Error) -> Self {
        RunnerError::Unexpected(format!("failed to {} '{}': {}", action, path.display(), err))
    }
}

/// Result type alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
