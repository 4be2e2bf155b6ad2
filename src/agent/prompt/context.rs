//! Per-step template context and child environment.
//!
//! The runner keeps one immutable [`BaseContext`] for the whole run and builds
//! a fresh [`StepContext`] from it on every step. Nothing here is mutated
//! across steps.

use crate::agent::AgentId;
use std::collections::{BTreeMap, HashMap};

/// Env var carrying the raw summary text.
pub const ENV_FEATURE_SUMMARY: &str = "RW_FEATURE_SUMMARY";

/// Env var carrying the loop flags text.
pub const ENV_LOOP_FLAGS: &str = "RW_LOOP_FLAGS";

/// Env var carrying the current step number.
pub const ENV_RUNNER_STEP: &str = "RW_RUNNER_STEP";

/// Env var carrying the current agent name.
pub const ENV_RUNNER_AGENT: &str = "RW_RUNNER_AGENT";

/// Values shared by every step of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseContext {
    /// Free-form feature summary.
    pub summary: String,
    /// Free-form flags for the loop stage.
    pub loop_flags: String,
}

impl BaseContext {
    /// The summary as a JSON string literal, quotes included.
    pub fn summary_json(&self) -> String {
        serde_json::Value::String(self.summary.clone()).to_string()
    }
}

/// Everything a single step knows about itself.
#[derive(Debug, Clone)]
pub struct StepContext {
    base: BaseContext,
    step: u32,
    agent: AgentId,
}

impl StepContext {
    pub fn new(base: &BaseContext, step: u32, agent: AgentId) -> Self {
        Self {
            base: base.clone(),
            step,
            agent,
        }
    }

    /// Template variables: `summary`, `summary_json`, `loop_flags`, `step`, `agent`.
    pub fn to_template_vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("summary".to_string(), self.base.summary.clone());
        vars.insert("summary_json".to_string(), self.base.summary_json());
        vars.insert("loop_flags".to_string(), self.base.loop_flags.clone());
        vars.insert("step".to_string(), self.step.to_string());
        vars.insert("agent".to_string(), self.agent.to_string());
        vars
    }

    /// Environment overlay for the stage process, applied over the inherited env.
    pub fn to_env_overlay(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert(ENV_FEATURE_SUMMARY.to_string(), self.base.summary.clone());
        env.insert(ENV_LOOP_FLAGS.to_string(), self.base.loop_flags.clone());
        env.insert(ENV_RUNNER_STEP.to_string(), self.step.to_string());
        env.insert(ENV_RUNNER_AGENT.to_string(), self.agent.to_string());
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::render_template;

    fn base() -> BaseContext {
        BaseContext {
            summary: "Add \"login\" page".to_string(),
            loop_flags: "--max-tasks 3".to_string(),
        }
    }

    #[test]
    fn test_summary_json_is_escaped_literal() {
        assert_eq!(base().summary_json(), r#""Add \"login\" page""#);
        assert_eq!(BaseContext::default().summary_json(), r#""""#);
    }

    #[test]
    fn test_template_vars_cover_step_fields() {
        let ctx = StepContext::new(&base(), 5, AgentId::Planner);
        let vars = ctx.to_template_vars();

        assert_eq!(vars["summary"], "Add \"login\" page");
        assert_eq!(vars["loop_flags"], "--max-tasks 3");
        assert_eq!(vars["step"], "5");
        assert_eq!(vars["agent"], "rw-planner");
        assert_eq!(vars.len(), 5);
    }

    #[test]
    fn test_step_and_agent_substituted_in_place() {
        let ctx = StepContext::new(&base(), 5, AgentId::Planner);
        let command = render_template("run --step={step} --as {agent}", &ctx.to_template_vars());
        assert_eq!(command, "run --step=5 --as rw-planner");
    }

    #[test]
    fn test_env_overlay() {
        let ctx = StepContext::new(&base(), 12, AgentId::Loop);
        let env = ctx.to_env_overlay();

        assert_eq!(env[ENV_FEATURE_SUMMARY], "Add \"login\" page");
        assert_eq!(env[ENV_LOOP_FLAGS], "--max-tasks 3");
        assert_eq!(env[ENV_RUNNER_STEP], "12");
        assert_eq!(env[ENV_RUNNER_AGENT], "rw-loop");
    }

    #[test]
    fn test_contexts_do_not_share_state() {
        let base = base();
        let first = StepContext::new(&base, 1, AgentId::Auto);
        let second = StepContext::new(&base, 2, AgentId::Planner);

        assert_eq!(first.to_template_vars()["step"], "1");
        assert_eq!(second.to_template_vars()["step"], "2");
        assert_eq!(first.to_env_overlay()[ENV_RUNNER_AGENT], "rw-auto");
    }
}
