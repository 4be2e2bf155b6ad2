//! rw-runner: top-level step runner for agent workflows.
//!
//! This is the main entry point for the `rw-runner` CLI. It parses arguments,
//! dispatches to the runner, and reports failures as a single `RUNNER_*`
//! reason line on stderr with a distinct exit code per failure class.

mod agent;
mod cli;
mod commands;
mod config;
mod error;
mod events;
mod exit_codes;
mod fs;
mod runner;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let result = Cli::parse_args().and_then(|cli| match cli {
        Some(cli) => commands::dispatch(cli),
        // Help or version was printed.
        None => Ok(()),
    });

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
