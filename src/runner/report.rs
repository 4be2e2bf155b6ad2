//! Line-oriented status output.
//!
//! Every line is `KEY=value` on its own, so a caller (or an outer runner)
//! can parse progress with the same last-match-wins token scan used for
//! routing directives.

use crate::agent::dispatch::ShellCommand;
use crate::agent::{AgentId, Route};
use crate::config::RunSettings;
use crate::error::{Result, RunnerError};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;

pub const MODE: &str = "RUNNER_MODE";
pub const DRY_RUN: &str = "RUNNER_DRY_RUN";
pub const START: &str = "RUNNER_START";
pub const MAX_STEPS: &str = "RUNNER_MAX_STEPS";
pub const LOG_DIR: &str = "RUNNER_LOG_DIR";
pub const STEP: &str = "RUNNER_STEP";
pub const AGENT: &str = "RUNNER_AGENT";
pub const COMMAND: &str = "RUNNER_COMMAND";
pub const DRY_RUN_NEXT: &str = "RUNNER_DRY_RUN_NEXT";
pub const STEP_LOG: &str = "RUNNER_STEP_LOG";
pub const NEXT_COMMAND: &str = "RUNNER_NEXT_COMMAND";
pub const STATUS: &str = "RUNNER_STATUS";

/// Mode marker for this runner.
pub const MODE_TOP_LEVEL: &str = "TOP_LEVEL";

/// Status value printed when the workflow reaches `done`.
pub const STATUS_DONE: &str = "DONE";

/// Writes status lines, flushing after each so they interleave correctly
/// with forwarded stage output.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn line(&mut self, key: &str, value: impl Display) -> Result<()> {
        writeln!(self.out, "{}={}", key, value)
            .and_then(|()| self.out.flush())
            .map_err(|e| RunnerError::Unexpected(format!("failed to write {} line: {}", key, e)))
    }

    pub fn run_header(&mut self, settings: &RunSettings) -> Result<()> {
        self.line(MODE, MODE_TOP_LEVEL)?;
        if settings.dry_run {
            self.line(DRY_RUN, 1)?;
        }
        self.line(START, settings.start)?;
        self.line(MAX_STEPS, settings.max_steps)?;
        self.line(LOG_DIR, settings.log_dir.display())
    }

    pub fn step_start(&mut self, step: u32, agent: AgentId, command: &ShellCommand) -> Result<()> {
        self.line(STEP, step)?;
        self.line(AGENT, agent)?;
        self.line(COMMAND, command)
    }

    pub fn dry_run_next(&mut self, next: Route) -> Result<()> {
        self.line(DRY_RUN_NEXT, next)
    }

    pub fn step_log(&mut self, path: &Path) -> Result<()> {
        self.line(STEP_LOG, path.display())
    }

    pub fn next_command(&mut self, next: Route) -> Result<()> {
        self.line(NEXT_COMMAND, next)
    }

    pub fn done(&mut self) -> Result<()> {
        self.line(STATUS, STATUS_DONE)
    }
}
