//! CLI argument parsing for rw-runner.
//!
//! Uses clap derive macros for declarative argument definitions. Every flag
//! accepts both `--flag value` and `--flag=value`. Parse failures are mapped
//! to `RUNNER_INVALID_ARG` instead of clap's own exit code so that a calling
//! process sees the same reason-line format for every failure.

use crate::agent::AgentId;
use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;

const TEMPLATE_HELP: &str = "\
Template variables:
  {summary}         Raw summary text
  {summary_json}    JSON-escaped summary text (quotes included)
  {loop_flags}      Loop flags text
  {step}            Current step number
  {agent}           Current agent name

Unknown {placeholders} are left untouched.

Stage commands see RW_FEATURE_SUMMARY, RW_LOOP_FLAGS, RW_RUNNER_STEP and
RW_RUNNER_AGENT in their environment, and route the workflow by printing
NEXT_COMMAND=<rw-auto|rw-planner|rw-loop|done> (last line wins).";

/// rw-runner: chain agent stages until one of them says `done`.
///
/// Runs the rw-auto, rw-planner and rw-loop stage commands one at a time.
/// After each stage the last `NEXT_COMMAND=` line of its output decides
/// which stage runs next.
#[derive(Parser, Debug, Default)]
#[command(name = "rw-runner")]
#[command(author, version, about, long_about = None)]
#[command(after_help = TEMPLATE_HELP)]
pub struct Cli {
    /// Command template for the rw-auto (router) stage.
    #[arg(long, value_name = "TEMPLATE", allow_hyphen_values = true)]
    pub auto_cmd: Option<String>,

    /// Command template for the rw-planner stage.
    #[arg(long, value_name = "TEMPLATE", allow_hyphen_values = true)]
    pub planner_cmd: Option<String>,

    /// Command template for the rw-loop stage.
    #[arg(long, value_name = "TEMPLATE", allow_hyphen_values = true)]
    pub loop_cmd: Option<String>,

    /// Feature summary passed to every stage.
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub summary: Option<String>,

    /// Agent to start with [default: rw-auto].
    #[arg(long, value_name = "AGENT")]
    pub start: Option<String>,

    /// Maximum number of steps, 1..=100 [default: 12].
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_steps: Option<i64>,

    /// Working directory for stage commands [default: current directory].
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Directory for step logs [default: <cwd>/.ai/runtime/orchestrator].
    #[arg(long, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Loop flags passed to every stage.
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub loop_flags: Option<String>,

    /// YAML runner file with templates and defaults; flags override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print resolved commands and the fixed stage progression without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Capture stage output to the step logs without echoing it.
    #[arg(long)]
    pub quiet_children: bool,
}

impl Cli {
    /// Parse the process arguments.
    ///
    /// Returns `Ok(None)` when help or version was requested and printed.
    pub fn parse_args() -> Result<Option<Self>> {
        Self::parse_from_args(std::env::args_os())
    }

    pub fn parse_from_args<I, T>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(Some(cli)),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = err.print();
                    Ok(None)
                }
                _ => Err(RunnerError::InvalidArg(first_error_line(&err))),
            },
        }
    }

    /// The settings given on the command line, as an override layer.
    pub fn overrides(&self) -> RunnerConfig {
        let mut config = RunnerConfig::default();

        let templates = [
            (AgentId::Auto, &self.auto_cmd),
            (AgentId::Planner, &self.planner_cmd),
            (AgentId::Loop, &self.loop_cmd),
        ];
        for (agent, template) in templates {
            if let Some(template) = template {
                config
                    .templates
                    .insert(agent.as_str().to_string(), template.clone());
            }
        }

        config.start = self.start.clone();
        config.max_steps = self.max_steps;
        config.cwd = self.cwd.clone();
        config.log_dir = self.log_dir.clone();
        config.summary = self.summary.clone();
        config.loop_flags = self.loop_flags.clone();
        config
    }
}

/// clap's message without the `error: ` prefix and usage block.
fn first_error_line(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).trim().to_string()
}
