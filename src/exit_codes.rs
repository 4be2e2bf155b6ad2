//! Exit code constants for the rw-runner CLI.
//!
//! Every failure class gets its own code so a wrapping script can tell
//! "raise the step ceiling" apart from "debug the stage":
//! - 0: Workflow reached `done`
//! - 1: User error (bad arguments or configuration)
//! - 2: A stage command exited non-zero
//! - 3: A stage exited cleanly without a routing directive
//! - 4: Step ceiling reached before `done`
//! - 5: Unexpected failure (filesystem, spawn, output)

/// Workflow completed.
pub const SUCCESS: i32 = 0;

/// User error: malformed arguments, missing templates, invalid start or ceiling.
pub const USER_ERROR: i32 = 1;

/// A stage command exited with a non-zero code.
pub const CHILD_FAILURE: i32 = 2;

/// A stage command produced no recognizable routing directive.
pub const MISSING_DIRECTIVE: i32 = 3;

/// The step ceiling was reached without reaching `done`.
pub const BUDGET_EXHAUSTED: i32 = 4;

/// Anything else: log directory creation, process spawn, report output.
pub const UNEXPECTED: i32 = 5;
