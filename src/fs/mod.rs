//! Filesystem utilities for the runner.
//!
//! Step logs are written atomically so a reader tailing the log directory
//! never sees a half-written file, and a re-run step replaces its old log.

pub mod atomic;

pub use atomic::atomic_write_file;
