//! The step machine that drives a workflow to `done`.
//!
//! Each step:
//!
//! 1. looks up the current agent's command template
//! 2. renders it against a fresh per-step context
//! 3. reports the step and the resolved command
//! 4. in dry-run mode, synthesizes the next agent from the fixed progression;
//!    otherwise runs the command, writes the step log, and reads the next
//!    agent from the command's `NEXT_COMMAND=` directive
//! 5. stops on `done`, or moves on to the next agent
//!
//! Stages run strictly one after another. The only state carried between
//! steps is the current agent and the step counter.

mod report;

#[cfg(test)]
mod tests;

pub use report::Reporter;

use crate::agent::dispatch::{self, ShellCommand, StepOutput};
use crate::agent::prompt::{StepContext, render_template};
use crate::agent::{AgentId, Route, parse_route};
use crate::config::RunSettings;
use crate::error::{Result, RunnerError};
use crate::events::{Event, EventAction, Journal};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;

/// One completed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: u32,
    pub agent: AgentId,
    /// The resolved command line.
    pub command: String,
    /// Where the output was written; `None` in dry-run mode.
    pub log_path: Option<PathBuf>,
    /// Where the workflow went next.
    pub next: Route,
}

/// A run that reached `done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub steps: Vec<StepRecord>,
}

impl RunOutcome {
    /// Compact per-step summary for the run journal.
    pub fn trace(&self) -> serde_json::Value {
        self.steps
            .iter()
            .map(|record| {
                json!({
                    "step": record.step,
                    "agent": record.agent.as_str(),
                    "command": record.command,
                    "log": record.log_path.as_ref().map(|p| p.display().to_string()),
                    "next": record.next.as_str(),
                })
            })
            .collect()
    }
}

/// Log file name for a step: `step-03-rw-loop.log`.
pub fn step_log_name(step: u32, agent: AgentId) -> String {
    format!("step-{:02}-{}.log", step, agent)
}

/// Drive the workflow described by `settings`, writing status lines to `out`.
///
/// Returns the completed steps when the workflow reaches `done`. Every other
/// ending is an error; see [`RunnerError`] for the classes.
pub fn run<W: Write>(settings: &RunSettings, out: W) -> Result<RunOutcome> {
    let mut runner = Runner {
        settings,
        report: Reporter::new(out),
        journal: None,
    };

    let result = runner.drive();

    if let Some(journal) = &runner.journal {
        let event = match &result {
            Ok(outcome) => Event::new(EventAction::RunDone).with_details(json!({
                "steps": outcome.steps.len(),
                "trace": outcome.trace(),
            })),
            Err(err) => Event::new(EventAction::RunFailed).with_details(json!({
                "reason": err.to_string(),
                "reason_code": err.reason(),
                "exit_code": err.exit_code(),
            })),
        };
        journal.record(&event);
    }

    result
}

struct Runner<'a, W: Write> {
    settings: &'a RunSettings,
    report: Reporter<W>,
    journal: Option<Journal>,
}

impl<W: Write> Runner<'_, W> {
    fn drive(&mut self) -> Result<RunOutcome> {
        let settings = self.settings;

        std::fs::create_dir_all(&settings.log_dir)
            .map_err(|e| RunnerError::io("create log directory", &settings.log_dir, e))?;

        self.report.run_header(settings)?;

        if !settings.dry_run {
            let journal = Journal::in_dir(&settings.log_dir);
            journal.record(&Event::new(EventAction::RunStart).with_details(json!({
                "start": settings.start.as_str(),
                "max_steps": settings.max_steps,
                "cwd": settings.cwd.display().to_string(),
                "log_dir": settings.log_dir.display().to_string(),
                "summary": settings.base.summary,
            })));
            self.journal = Some(journal);
        }

        let mut current = settings.start;
        let mut steps = Vec::new();

        for step in 1..=settings.max_steps {
            let record = self.run_step(step, current)?;
            let next = record.next;
            steps.push(record);

            match next {
                Route::Done => {
                    self.report.done()?;
                    return Ok(RunOutcome { steps });
                }
                Route::Agent(agent) => current = agent,
            }
        }

        Err(RunnerError::MaxStepsReached {
            max_steps: settings.max_steps,
        })
    }

    fn run_step(&mut self, step: u32, agent: AgentId) -> Result<StepRecord> {
        let settings = self.settings;

        let template = settings
            .template(agent)
            .ok_or_else(|| RunnerError::TemplateMissing {
                agent: agent.to_string(),
            })?;

        let context = StepContext::new(&settings.base, step, agent);
        let command = ShellCommand::new(render_template(template, &context.to_template_vars()));

        self.report.step_start(step, agent, &command)?;

        if settings.dry_run {
            let next = agent.dry_run_next();
            self.report.dry_run_next(next)?;
            return Ok(StepRecord {
                step,
                agent,
                command: command.to_string(),
                log_path: None,
                next,
            });
        }

        let output = self.execute(&command, &context)?;
        let combined = output.combined();

        // The log is written before the exit code is judged so a failing
        // stage still leaves its output behind.
        let log_path = settings.log_dir.join(step_log_name(step, agent));
        atomic_write_file(&log_path, &combined)?;
        self.report.step_log(&log_path)?;

        let next = if output.is_success() {
            parse_route(&combined)
        } else {
            None
        };

        if let Some(journal) = &self.journal {
            journal.record(
                &Event::new(EventAction::StepComplete)
                    .with_step(step, agent.as_str())
                    .with_details(json!({
                        "command": command.as_str(),
                        "exit_code": output.exit_code,
                        "log": log_path.display().to_string(),
                        "next": next.map(Route::as_str),
                    })),
            );
        }

        if !output.is_success() {
            return Err(RunnerError::ChildExitNonzero {
                code: output.exit_code,
                agent: agent.to_string(),
            });
        }

        let next = next.ok_or_else(|| RunnerError::NextCommandMissing {
            agent: agent.to_string(),
        })?;
        self.report.next_command(next)?;

        Ok(StepRecord {
            step,
            agent,
            command: command.to_string(),
            log_path: Some(log_path),
            next,
        })
    }

    fn execute(&self, command: &ShellCommand, context: &StepContext) -> Result<StepOutput> {
        let settings = self.settings;
        let env = context.to_env_overlay();

        if settings.echo_children {
            dispatch::execute(command, &settings.cwd, &env)
        } else {
            dispatch::execute_with_sinks(command, &settings.cwd, &env, io::sink(), io::sink())
        }
    }
}
