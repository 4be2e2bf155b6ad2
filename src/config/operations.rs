//! Config loading, validation, and merging.

use super::model::RunnerConfig;
use crate::agent::AgentId;
use crate::error::{Result, RunnerError};
use std::path::Path;

impl RunnerConfig {
    /// Load a runner file from YAML.
    ///
    /// # Returns
    ///
    /// * `Ok(RunnerConfig)` - Successfully loaded and validated config
    /// * `Err(RunnerError::ConfigInvalid)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| RunnerError::ConfigInvalid {
            path: path.to_path_buf(),
            message: format!("failed to read file: {}", e),
        })?;

        Self::from_yaml(&content, path)
    }

    /// Parse a runner file body. `source` is only used in error messages.
    pub fn from_yaml(yaml: &str, source: &Path) -> Result<Self> {
        let config: RunnerConfig =
            serde_yaml::from_str(yaml).map_err(|e| RunnerError::ConfigInvalid {
                path: source.to_path_buf(),
                message: format!("failed to parse YAML: {}", e),
            })?;

        config.validate().map_err(|message| RunnerError::ConfigInvalid {
            path: source.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    /// Check what can be checked without the other layer.
    ///
    /// Template keys must name a stage. Whether all stages end up with a
    /// template, and whether the start and ceiling are valid, is decided on
    /// the merged config by `RunSettings::resolve`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for name in self.templates.keys() {
            if AgentId::parse(name).is_none() {
                return Err(format!(
                    "unknown template key '{}' (expected one of: {})",
                    name,
                    AgentId::ALL.map(AgentId::as_str).join(", ")
                ));
            }
        }
        Ok(())
    }

    /// Layer `overrides` on top of `self`; any field set in `overrides` wins.
    pub fn merge(mut self, overrides: RunnerConfig) -> RunnerConfig {
        self.templates.extend(overrides.templates);
        RunnerConfig {
            templates: self.templates,
            start: overrides.start.or(self.start),
            max_steps: overrides.max_steps.or(self.max_steps),
            cwd: overrides.cwd.or(self.cwd),
            log_dir: overrides.log_dir.or(self.log_dir),
            summary: overrides.summary.or(self.summary),
            loop_flags: overrides.loop_flags.or(self.loop_flags),
        }
    }
}
