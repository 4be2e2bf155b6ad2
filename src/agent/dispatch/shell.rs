//! Opaque shell command lines.

use std::fmt;
use std::process::Command;

/// A fully rendered stage command, executed verbatim by the platform shell.
///
/// On Unix: `sh -c "<command>"`. On Windows: `cmd /C "<command>"`.
///
/// The string is operator-authored and trusted. Substituted template values
/// (summary text, flags) land inside it unescaped, so a template that
/// interpolates untrusted text must quote it itself (`{summary_json}` is
/// already a quoted literal). Shell syntax differs between platforms, so
/// templates written for `sh` are not portable to `cmd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand(String);

impl ShellCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self(command.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a process invocation that hands the command line to the shell.
    pub fn to_command(&self) -> Command {
        #[cfg(windows)]
        {
            let mut command = Command::new("cmd");
            command.args(["/C", &self.0]);
            command
        }
        #[cfg(not(windows))]
        {
            let mut command = Command::new("sh");
            command.arg("-c").arg(&self.0);
            command
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
