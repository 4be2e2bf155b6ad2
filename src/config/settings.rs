//! Validated, immutable settings for one run.

use super::model::{DEFAULT_LOG_DIR, DEFAULT_MAX_STEPS, MAX_STEPS_LIMIT, RunnerConfig};
use crate::agent::AgentId;
use crate::agent::prompt::BaseContext;
use crate::error::{Result, RunnerError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the driver needs, checked once before the loop starts.
///
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct RunSettings {
    templates: BTreeMap<AgentId, String>,
    /// First agent to run.
    pub start: AgentId,
    /// Step ceiling, within 1..=100.
    pub max_steps: u32,
    /// Working directory for stage commands.
    pub cwd: PathBuf,
    /// Directory for step logs and the run journal.
    pub log_dir: PathBuf,
    /// Summary and flags shared by every step.
    pub base: BaseContext,
    /// Preview commands and synthesize routes instead of executing.
    pub dry_run: bool,
    /// Forward stage output live to this process's stdout/stderr.
    pub echo_children: bool,
}

impl RunSettings {
    /// Validate a merged config.
    ///
    /// Checks run in this order, first failure wins:
    /// 1. every stage has a non-blank template (`RUNNER_TEMPLATE_MISSING`)
    /// 2. the start agent is a stage (`RUNNER_INVALID_START`)
    /// 3. the step ceiling is in 1..=100 (`RUNNER_INVALID_MAX_STEPS`)
    ///
    /// Relative paths are resolved against `invocation_dir`.
    pub fn resolve(config: RunnerConfig, invocation_dir: &Path) -> Result<Self> {
        let RunnerConfig {
            mut templates,
            start,
            max_steps,
            cwd,
            log_dir,
            summary,
            loop_flags,
        } = config;

        let mut resolved = BTreeMap::new();
        for agent in AgentId::ALL {
            match templates.remove(agent.as_str()) {
                Some(template) if !template.trim().is_empty() => {
                    resolved.insert(agent, template);
                }
                _ => {
                    return Err(RunnerError::TemplateMissing {
                        agent: agent.to_string(),
                    });
                }
            }
        }

        let start = match start {
            Some(name) => AgentId::parse(&name).ok_or(RunnerError::InvalidStart { value: name })?,
            None => AgentId::Auto,
        };

        let max_steps = max_steps.unwrap_or(DEFAULT_MAX_STEPS);
        if !(1..=MAX_STEPS_LIMIT).contains(&max_steps) {
            return Err(RunnerError::InvalidMaxSteps { value: max_steps });
        }
        let max_steps = u32::try_from(max_steps)
            .map_err(|_| RunnerError::InvalidMaxSteps { value: max_steps })?;

        let cwd = match cwd {
            Some(cwd) => invocation_dir.join(cwd),
            None => invocation_dir.to_path_buf(),
        };
        let log_dir = match log_dir {
            Some(log_dir) => invocation_dir.join(log_dir),
            None => cwd.join(DEFAULT_LOG_DIR),
        };

        Ok(Self {
            templates: resolved,
            start,
            max_steps,
            cwd,
            log_dir,
            base: BaseContext {
                summary: summary.unwrap_or_default(),
                loop_flags: loop_flags.unwrap_or_default(),
            },
            dry_run: false,
            echo_children: true,
        })
    }

    /// The command template for a stage, if one is configured.
    pub fn template(&self, agent: AgentId) -> Option<&str> {
        self.templates.get(&agent).map(String::as_str)
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_echo_children(mut self, echo_children: bool) -> Self {
        self.echo_children = echo_children;
        self
    }
}
