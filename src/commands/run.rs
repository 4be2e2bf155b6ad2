//! `rw-runner` main operation: resolve settings, then drive the workflow.

use crate::cli::Cli;
use crate::config::{RunSettings, RunnerConfig};
use crate::error::{Result, RunnerError};
use crate::runner;
use std::io;
use std::path::Path;

pub fn cmd_run(cli: Cli) -> Result<()> {
    let invocation_dir = std::env::current_dir().map_err(|e| {
        RunnerError::Unexpected(format!("failed to get current working directory: {}", e))
    })?;

    let settings = resolve_settings(&cli, &invocation_dir)?;
    runner::run(&settings, io::stdout())?;
    Ok(())
}

/// Merge the runner file (if any) with command-line overrides and validate.
pub fn resolve_settings(cli: &Cli, invocation_dir: &Path) -> Result<RunSettings> {
    let file = match &cli.config {
        Some(path) => RunnerConfig::load(invocation_dir.join(path))?,
        None => RunnerConfig::default(),
    };

    let settings = RunSettings::resolve(file.merge(cli.overrides()), invocation_dir)?;
    Ok(settings
        .with_dry_run(cli.dry_run)
        .with_echo_children(!cli.quiet_children))
}
