//! Command implementations for rw-runner.
//!
//! The runner has a single operation; this module turns parsed arguments
//! into validated settings and hands them to the step machine.

mod run;

use crate::cli::Cli;
use crate::error::Result;

/// Dispatch parsed arguments to their implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    run::cmd_run(cli)
}
