//! Agent stages for the top-level runner.
//!
//! This module provides the pieces the runner needs to drive one stage:
//!
//! - **Identity**: the closed set of stages (`rw-auto`, `rw-planner`, `rw-loop`)
//!   plus the terminal `done` route
//! - **Prompt**: `{variable}` command templates and the per-step context
//! - **Routing**: `NEXT_COMMAND=` directive extraction from stage output
//! - **Dispatch**: shell execution with live output forwarding and capture
//!
//! # Design Philosophy
//!
//! Stages are opaque shell commands supplied by the operator. The runner only
//! looks at their exit code and at the last routing directive they print; what
//! a stage actually does is its own business.

pub mod dispatch;
mod identity;
pub mod prompt;
pub mod routing;

// Re-export public API
pub use identity::{AgentId, Route};
pub use routing::parse_route;
