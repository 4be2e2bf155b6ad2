//! Routing directive extraction from stage output.
//!
//! A stage announces what should run next by printing a line of the form
//! `NEXT_COMMAND=<route>`. Stages may print several such lines (progress,
//! diagnostics, echoed prompts); only the last one counts.
//!
//! Older stages print `AUTO_ROUTE_TARGET=<route>` instead. It is consulted only
//! when the primary token yields no valid route.

use crate::agent::Route;
use regex::Regex;

/// Primary routing token.
pub const NEXT_COMMAND_TOKEN: &str = "NEXT_COMMAND";

/// Legacy routing token, still emitted by older router prompts.
pub const LEGACY_ROUTE_TOKEN: &str = "AUTO_ROUTE_TARGET";

/// Find the value of the last `<token>=<value>` line in `output`.
///
/// The line must start with the token at column zero and carry at least one
/// character after `=`. The value is trimmed. CRLF line endings are accepted.
///
/// Returns `None` when no line matches; an empty `Some` is only possible for
/// a value made entirely of whitespace.
pub fn extract_last_token(output: &str, token: &str) -> Option<String> {
    let pattern = format!(r"(?mR)^{}=([^\r\n]+)$", regex::escape(token));
    let regex = Regex::new(&pattern).ok()?;

    regex
        .captures_iter(output)
        .last()
        .map(|caps| caps[1].trim().to_string())
}

/// Decode the route a stage asked for.
///
/// Tries [`NEXT_COMMAND_TOKEN`] first, then [`LEGACY_ROUTE_TOKEN`]. A value
/// outside the known set counts as absent.
pub fn parse_route(output: &str) -> Option<Route> {
    [NEXT_COMMAND_TOKEN, LEGACY_ROUTE_TOKEN]
        .into_iter()
        .find_map(|token| extract_last_token(output, token).and_then(|value| Route::parse(&value)))
}
