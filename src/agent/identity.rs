//! Agent identities and routes.

use std::fmt;

/// One runnable stage of the workflow.
///
/// The set is closed: a routing directive naming anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgentId {
    /// Router stage (`rw-auto`).
    Auto,
    /// Planning stage (`rw-planner`).
    Planner,
    /// Execution loop stage (`rw-loop`).
    Loop,
}

impl AgentId {
    /// All stages, in fallback progression order.
    pub const ALL: [AgentId; 3] = [AgentId::Auto, AgentId::Planner, AgentId::Loop];

    /// The wire name used in templates, tokens, env vars, and log file names.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentId::Auto => "rw-auto",
            AgentId::Planner => "rw-planner",
            AgentId::Loop => "rw-loop",
        }
    }

    /// Parse a stage name. `done` is a route, not a stage, and yields `None`.
    pub fn parse(name: &str) -> Option<Self> {
        AgentId::ALL.into_iter().find(|agent| agent.as_str() == name)
    }

    /// The route synthesized for this stage in dry-run mode.
    ///
    /// `rw-auto -> rw-planner -> rw-loop -> done`.
    pub fn dry_run_next(self) -> Route {
        match self {
            AgentId::Auto => Route::Agent(AgentId::Planner),
            AgentId::Planner => Route::Agent(AgentId::Loop),
            AgentId::Loop => Route::Done,
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the workflow goes after a step: another stage or the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Agent(AgentId),
    Done,
}

impl Route {
    /// Wire name of the terminal route.
    pub const DONE: &'static str = "done";

    /// Parse a routing value. Anything outside the known set yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        if value == Self::DONE {
            return Some(Route::Done);
        }
        AgentId::parse(value).map(Route::Agent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Route::Agent(agent) => agent.as_str(),
            Route::Done => Self::DONE,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
