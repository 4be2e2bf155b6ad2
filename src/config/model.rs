//! RunnerConfig struct definition.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default step ceiling.
pub const DEFAULT_MAX_STEPS: i64 = 12;

/// Highest accepted step ceiling.
pub const MAX_STEPS_LIMIT: i64 = 100;

/// Default log directory, relative to the child working directory.
pub const DEFAULT_LOG_DIR: &str = ".ai/runtime/orchestrator";

/// Unvalidated runner settings, as read from a runner file or the command line.
///
/// Every field is optional so two layers can be merged. Unknown top-level
/// keys in the YAML are ignored for forward compatibility.
///
/// ```yaml
/// templates:
///   rw-auto: claude -p "/rw-auto {summary_json}"
///   rw-planner: claude -p "/rw-planner"
///   rw-loop: claude -p "/rw-loop {loop_flags}"
/// max_steps: 20
/// summary: Add a login page
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Command templates keyed by agent name (`rw-auto`, `rw-planner`, `rw-loop`).
    pub templates: BTreeMap<String, String>,

    /// Agent to start with (default: `rw-auto`).
    pub start: Option<String>,

    /// Step ceiling (default: 12, accepted: 1..=100).
    pub max_steps: Option<i64>,

    /// Working directory for stage commands (default: invocation directory).
    pub cwd: Option<PathBuf>,

    /// Where step logs and the run journal go (default: `{cwd}/.ai/runtime/orchestrator`).
    pub log_dir: Option<PathBuf>,

    /// Free-form feature summary.
    pub summary: Option<String>,

    /// Free-form loop flags.
    pub loop_flags: Option<String>,
}
