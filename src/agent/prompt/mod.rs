//! Command template rendering for stage execution.
//!
//! This module provides:
//!
//! - **Template**: `{variable}` substitution for stage command templates
//! - **Context**: the per-step variables and child environment overlay
//!
//! # Template Syntax
//!
//! Templates use `{variable}` placeholders, where the name is made of ASCII
//! letters, digits, and underscores:
//!
//! ```text
//! claude -p "/rw-loop {loop_flags}" --summary {summary_json} # step {step}
//! ```
//!
//! Placeholders that name no known variable are left in place untouched, so a
//! template can carry braces meant for the shell or for a later expansion.

mod context;
mod template;

pub use context::{BaseContext, StepContext};
pub use template::render_template;
