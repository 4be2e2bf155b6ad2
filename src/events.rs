//! Run journal for the runner.
//!
//! Every real (non dry-run) run appends structured events to
//! `events.ndjson` in the log directory, one JSON object per line. The
//! `RUNNER_*` stdout lines are the contract for a parent process; the journal
//! is the after-the-fact record of what happened across runs.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: `run_start`, `step_complete`, `run_done`, or `run_failed`
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `step`: Step number for step events
//! - `agent`: Agent name for step events
//! - `details`: Freeform object with action-specific details
//!
//! Journal writes never decide the outcome of a run; see [`Journal::record`].

use crate::error::{Result, RunnerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the journal inside the log directory.
pub const EVENTS_FILE_NAME: &str = "events.ndjson";

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Run started (settings resolved, log directory ready)
    RunStart,
    /// A stage command finished and its log was written
    StepComplete,
    /// The workflow reached `done`
    RunDone,
    /// The run ended with an error
    RunFailed,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::RunStart => write!(f, "run_start"),
            EventAction::StepComplete => write!(f, "step_complete"),
            EventAction::RunDone => write!(f, "run_done"),
            EventAction::RunFailed => write!(f, "run_failed"),
        }
    }
}

/// An event record for the run journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// The actor running the workflow (e.g., `user@HOST`).
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            step: None,
            agent: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach the step this event belongs to.
    pub fn with_step(mut self, step: u32, agent: impl Into<String>) -> Self {
        self.step = Some(step);
        self.agent = Some(agent.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            RunnerError::Unexpected(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append-only NDJSON journal in a log directory.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn in_dir(log_dir: &Path) -> Self {
        Self {
            path: log_dir.join(EVENTS_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event as one JSON line, creating the file if needed.
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .map_err(|e| RunnerError::io("open events file", self.path(), e))?;

        writeln!(file, "{}", json_line)
            .map_err(|e| RunnerError::io("write event to", self.path(), e))?;

        Ok(())
    }

    /// Best-effort append: a failure becomes a warning on stderr.
    pub fn record(&self, event: &Event) {
        if let Err(e) = self.append(event) {
            eprintln!("Warning: failed to log {} event: {}", event.action, e);
        }
    }
}
