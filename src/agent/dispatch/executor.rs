//! Stage subprocess executor.
//!
//! Runs a stage command to completion, forwarding its output live while
//! capturing it. There is no timeout: stages are long-running interactive
//! agent sessions and the run waits for them.

use super::shell::ShellCommand;
use crate::error::{Result, RunnerError};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::Stdio;
use std::thread;

/// Exit code reported when the process ended without one (killed by a signal).
const ABNORMAL_EXIT_CODE: i32 = 1;

/// Captured result of one stage execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Exit code; `1` if the process terminated abnormally.
    pub exit_code: i32,
    /// Everything the process wrote to stdout.
    pub stdout: String,
    /// Everything the process wrote to stderr.
    pub stderr: String,
}

impl StepOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// All of stdout followed by all of stderr.
    ///
    /// The streams are captured independently, so this is not wall-clock order.
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }
}

/// Execute a stage command, forwarding its output to this process's stdout/stderr.
///
/// A non-zero exit code is returned as data, not as an error.
pub fn execute(
    command: &ShellCommand,
    cwd: &Path,
    env: &BTreeMap<String, String>,
) -> Result<StepOutput> {
    execute_with_sinks(command, cwd, env, io::stdout(), io::stderr())
}

/// Execute a stage command, forwarding its output to the given sinks.
///
/// Each stream is drained on its own thread so a chatty stderr can never
/// block stdout (or the reverse). Forwarding failures are ignored; capture
/// continues regardless.
///
/// # Errors
///
/// Only failures to start or wait on the process are errors.
pub fn execute_with_sinks<O, E>(
    command: &ShellCommand,
    cwd: &Path,
    env: &BTreeMap<String, String>,
    live_stdout: O,
    live_stderr: E,
) -> Result<StepOutput>
where
    O: Write + Send,
    E: Write + Send,
{
    let mut process = command.to_command();
    process
        .current_dir(cwd)
        .envs(env)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = process.spawn().map_err(|e| {
        RunnerError::Unexpected(format!(
            "failed to execute command '{}' in '{}': {}",
            command,
            cwd.display(),
            e
        ))
    })?;

    let child_stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::Unexpected("child stdout was not captured".to_string()))?;
    let child_stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::Unexpected("child stderr was not captured".to_string()))?;

    let (stdout, stderr) = thread::scope(|scope| {
        let out = scope.spawn(move || tee(child_stdout, live_stdout));
        let err = scope.spawn(move || tee(child_stderr, live_stderr));
        (join_capture(out.join()), join_capture(err.join()))
    });

    let status = child.wait().map_err(|e| {
        RunnerError::Unexpected(format!("failed to wait for command '{}': {}", command, e))
    })?;

    Ok(StepOutput {
        exit_code: status.code().unwrap_or(ABNORMAL_EXIT_CODE),
        stdout: String::from_utf8_lossy(&stdout?).into_owned(),
        stderr: String::from_utf8_lossy(&stderr?).into_owned(),
    })
}

/// Copy `reader` to `sink` chunk by chunk, keeping every byte read.
fn tee<R: Read, W: Write>(mut reader: R, mut sink: W) -> io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        captured.extend_from_slice(&buf[..n]);
        let _ = sink.write_all(&buf[..n]);
        let _ = sink.flush();
    }

    Ok(captured)
}

fn join_capture(joined: thread::Result<io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    match joined {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(RunnerError::Unexpected(format!(
            "failed to read child output: {}",
            e
        ))),
        Err(_) => Err(RunnerError::Unexpected("child output reader panicked".to_string())),
    }
}
