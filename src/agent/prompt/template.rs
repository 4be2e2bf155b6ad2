//! Template engine for variable substitution.
//!
//! # Syntax
//!
//! - `{name}` - Substitutes the value of variable `name` when it is defined
//! - `{name}` with `name` undefined - Left verbatim
//! - Anything else (`{}`, `{a-b}`, lone braces) - Left verbatim
//!
//! Unlike a strict engine, undefined variables are not errors. Stage templates
//! are shell command lines and routinely contain braces of their own.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Placeholder pattern: `{identifier}` with identifier in `[A-Za-z0-9_]+`.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("Invalid placeholder regex"));

/// Render a template string by substituting the variables it knows about.
///
/// Values are inserted literally: `$`, quotes, and braces in a value are not
/// interpreted, and substituted text is never re-scanned for placeholders.
///
/// # Examples
///
/// ```text
/// render_template("run {agent} at {step} in {cwd}", {agent: "rw-loop", step: "5"})
///     == "run rw-loop at 5 in {cwd}"
/// ```
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
pub(crate) fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
