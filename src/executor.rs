//! Shell execution of chosen suggestions.
//!
//! The chosen command runs through `sh -c` with stdout passed straight to
//! the terminal and stderr captured, so a failure can be fed back into the
//! fix prompt. Process spawning sits behind [`ProcessRunner`] so tests run
//! without real subprocesses.

use crate::suggestion::Suggestion;
use anyhow::{anyhow, Result};
use std::process::{Command, Stdio};
use tracing::{error, info};

/// Outcome of one shell execution.
#[derive(Debug, Clone)]
pub struct ShellOutcome {
    /// Process exit code; -1 when the process was killed by a signal.
    pub exit_code: i32,
    /// Captured standard error output.
    pub stderr: String,
}

impl ShellOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running subprocesses.
pub trait ProcessRunner: Send + Sync {
    /// Runs a command line through the shell. Stdout is inherited by the
    /// terminal; stderr is captured into the outcome.
    fn run_shell(&self, command: &str) -> Result<ShellOutcome>;

    /// Runs a program with arguments and returns its trimmed stdout.
    fn capture(&self, program: &str, args: &[&str]) -> Result<String>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run_shell(&self, command: &str) -> Result<ShellOutcome> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ShellOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn capture(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program).args(args).output()?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Executes suggestions through the shell.
pub struct Executor;

impl Executor {
    /// Runs the suggestion's command text and reports the outcome.
    ///
    /// A non-zero exit is not an error here: it is a normal outcome the
    /// session turns into a fix offer. Errors mean the command could not
    /// be run at all.
    pub fn execute(
        &self,
        suggestion: &Suggestion,
        runner: &dyn ProcessRunner,
    ) -> Result<ShellOutcome> {
        if !runner.program_exists("sh") {
            return Err(anyhow!("No shell found in PATH, cannot execute commands"));
        }

        info!("Executing suggestion: {}", suggestion.command);
        let outcome = runner.run_shell(&suggestion.command)?;

        if !outcome.success() {
            error!(
                "Command failed with exit code {}: {}",
                outcome.exit_code, suggestion.command
            );
        }

        Ok(outcome)
    }
}
