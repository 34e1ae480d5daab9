//! # Subprocess Execution
//!
//! Every external program this tool drives (in practice only `git`) is run
//! through the [`CommandRunner`] trait. Arguments are always passed as an
//! explicit list, never through a shell, and the result is captured into a
//! [`CommandOutput`] so callers can decide how to react to a failure.
//!
//! The default implementation, [`SystemRunner`], spawns real processes. Tests
//! substitute a fake runner that records invocations and replays scripted
//! outputs.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed output with the given exit code and stderr.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for running external programs - allows faking in tests
pub trait CommandRunner {
    /// Run `program` with `args` in `cwd` (or the current directory) and wait
    /// for it to finish.
    ///
    /// Returns `Err` only when the process could not be started. A process
    /// that ran and exited non-zero is reported through
    /// [`CommandOutput::code`].
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    envs: Vec<(String, String)>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable for every spawned process.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let output = command.output().map_err(|e| Error::GitCommand {
            command: format!("{} {}", program, args.join(" ")),
            dir: cwd
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| ".".to_string()),
            stderr: e.to_string(),
        })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
