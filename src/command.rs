//! External command execution
//!
//! Every install task reaches the outside world through a [`CommandRunner`].
//! Production code uses [`SystemRunner`], which spawns each command in its
//! own process group and registers it with the global
//! [`ChildRegistry`](crate::process_guard::ChildRegistry) so an interrupted
//! wizard never leaves a `brew install` running behind it.
//! Tests use [`RecordingRunner`].

use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, info};

/// Result of one finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit status was zero
    pub exit_ok: bool,
    /// stdout followed by stderr
    pub combined_output: String,
}

impl CommandOutput {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            exit_ok: true,
            combined_output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            exit_ok: false,
            combined_output: output.into(),
        }
    }

    /// Turn a failed exit into an error carrying the command's output
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.exit_ok {
            Ok(())
        } else {
            anyhow::bail!("{} failed: {}", context, self.combined_output.trim())
        }
    }

    /// First non-empty line of the output, trimmed
    pub fn first_line(&self) -> Option<String> {
        self.combined_output
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Render a command line for logs and error messages
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capability to run an external program to completion
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait for it.
    ///
    /// `Err` means the program could not be started at all; a non-zero exit
    /// is reported through [`CommandOutput::exit_ok`].
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput>;

    /// Run and require a zero exit status
    fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let line = display_command(program, args);
        let output = self
            .run(program, args)
            .map_err(|e| anyhow::anyhow!("failed to start `{}`: {}", line, e))?;
        output.ensure_success(&format!("`{}`", line))?;
        Ok(output)
    }
}

/// Spawns real processes with process-group isolation
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    extra_path: Vec<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directories searched before `PATH`.
    ///
    /// A fresh machine gains `/opt/homebrew/bin` and `~/.cargo/bin` halfway
    /// through the install queue, so later tasks must see them.
    pub fn with_extra_path(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.extra_path.extend(dirs);
        self
    }

    fn search_path(&self) -> Option<OsString> {
        if self.extra_path.is_empty() {
            return None;
        }
        let existing = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .extra_path
            .iter()
            .cloned()
            .chain(std::env::split_paths(&existing));
        std::env::join_paths(dirs).ok()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        info!(command = %display_command(program, args), "running");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .in_new_process_group();
        if let Some(path) = self.search_path() {
            cmd.env("PATH", path);
        }

        let child = cmd.spawn()?;
        let pid = child.id();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.track(pid);
        }

        let output = child.wait_with_output();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.release(pid);
        }

        let output = output?;
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        debug!(
            program,
            exit_code = ?output.status.code(),
            "command finished"
        );

        Ok(CommandOutput {
            exit_ok: output.status.success(),
            combined_output: combined,
        })
    }
}

/// Scripted runner that records every invocation instead of spawning it.
///
/// Responses are matched by command-line prefix, first match wins; anything
/// unmatched succeeds with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    responses: Vec<(String, Response)>,
}

#[derive(Debug, Clone)]
enum Response {
    Output(CommandOutput),
    SpawnError,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` exit non-zero with `output`
    pub fn fail_on(mut self, prefix: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses
            .push((prefix.into(), Response::Output(CommandOutput::failed(output))));
        self
    }

    /// Commands starting with `prefix` succeed with `output`
    pub fn respond(mut self, prefix: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses
            .push((prefix.into(), Response::Output(CommandOutput::ok(output))));
        self
    }

    /// Commands starting with `prefix` cannot be started
    pub fn missing(mut self, prefix: impl Into<String>) -> Self {
        self.responses.push((prefix.into(), Response::SpawnError));
        self
    }

    /// Every command line run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        let line = display_command(program, args);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }

        match self
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
        {
            Some((_, Response::Output(output))) => Ok(output.clone()),
            Some((_, Response::SpawnError)) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: command not found", program),
            )),
            None => Ok(CommandOutput::ok("")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_runner_captures_output() {
        let runner = SystemRunner::new();
        let output = runner.run("sh", &["-c", "echo out; echo err >&2"]).unwrap();

        assert!(output.exit_ok);
        assert!(output.combined_output.contains("out"));
        assert!(output.combined_output.contains("err"));
    }

    #[test]
    fn test_system_runner_reports_failure() {
        let runner = SystemRunner::new();
        let output = runner.run("sh", &["-c", "echo boom; exit 3"]).unwrap();

        assert!(!output.exit_ok);
        let err = output.ensure_success("sh").unwrap_err();
        assert_eq!(err.to_string(), "sh failed: boom");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        assert!(runner.run("freshbox-definitely-missing", &[]).is_err());
    }

    #[test]
    fn test_run_checked_includes_command_line() {
        let runner = RecordingRunner::new().fail_on("brew install", "Error: No formulae found");
        let err = runner.run_checked("brew", &["install", "nope"]).unwrap_err();

        assert!(err.to_string().contains("`brew install nope`"));
        assert!(err.to_string().contains("No formulae found"));
    }

    #[test]
    fn test_recording_runner_records_calls() {
        let runner = RecordingRunner::new().respond("fnm --version", "fnm 1.37.1\n");

        let out = runner.run("fnm", &["--version"]).unwrap();
        runner.run("git", &["--version"]).unwrap();

        assert_eq!(out.first_line().as_deref(), Some("fnm 1.37.1"));
        assert_eq!(runner.calls(), ["fnm --version", "git --version"]);
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        let out = CommandOutput::ok("\n\n  openjdk 21.0.2\nmore\n");
        assert_eq!(out.first_line().as_deref(), Some("openjdk 21.0.2"));
        assert_eq!(CommandOutput::ok("").first_line(), None);
    }
}
