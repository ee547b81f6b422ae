//! External process invocation and output capture.
//!
//! Every external program the harness touches (the Java test driver, the
//! provisioning helpers) goes through the [`CommandRunner`] abstraction so
//! behavioural tests can replay scripted output without spawning anything.
//! The real runner spawns the child inside its own working directory; the
//! harness process never changes its current directory.

use std::ffi::OsString;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use shell_escape::unix::escape;
use thiserror::Error;

/// A single external command to run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessInvocation {
    /// Program to execute. Relative paths containing a separator (for example
    /// `./test.sh`) resolve against [`ProcessInvocation::working_dir`].
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
    /// Directory the child runs in. `None` inherits the harness directory.
    pub working_dir: Option<Utf8PathBuf>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl ProcessInvocation {
    /// Starts an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<OsString>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets the working directory for the child process.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Returns the program path the runner will spawn.
    ///
    /// A relative program that names a path (contains `/`) is joined onto an
    /// absolute working directory so it resolves the same way a shell started
    /// in that directory would. A relative working directory is applied only
    /// once, by the child's `current_dir`. Bare names are left for `PATH`
    /// lookup.
    #[must_use]
    pub fn resolved_program(&self) -> String {
        let program = Utf8Path::new(&self.program);
        match self.working_dir {
            Some(ref dir)
                if dir.is_absolute() && program.is_relative() && self.program.contains('/') =>
            {
                dir.join(program).into_string()
            }
            _ => self.program.clone(),
        }
    }

    /// Renders the invocation as a shell-like string for logs and messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(escape(self.program.as_str().into()).into_owned());
        for arg in &self.args {
            let lossy = arg.to_string_lossy();
            parts.push(escape(lossy).into_owned());
        }
        parts.join(" ")
    }
}

/// Result of running an external command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code reported by the process, if available.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the exit code equals zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Returns stdout followed by stderr as one buffer.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut buffer = String::with_capacity(self.stdout.len() + self.stderr.len());
        buffer.push_str(&self.stdout);
        buffer.push_str(&self.stderr);
        buffer
    }

    /// Human readable exit status (`unknown` when the process was signalled).
    #[must_use]
    pub fn status_text(&self) -> String {
        self.code
            .map_or_else(|| String::from("unknown"), |code| code.to_string())
    }
}

/// Errors raised while starting external processes.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProcessError {
    /// Raised when the configured working directory does not exist.
    #[error("working directory {path} does not exist")]
    MissingWorkingDir {
        /// Directory the child was meant to run in.
        path: Utf8PathBuf,
    },
    /// Raised when a command cannot be spawned.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Command that failed to start.
        program: String,
        /// Operating system error string.
        message: String,
    },
}

/// Abstraction over command execution to support fakes in tests.
pub trait CommandRunner {
    /// Runs the invocation to completion, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] if the command cannot be started.
    fn run(&self, invocation: &ProcessInvocation) -> Result<CommandOutput, ProcessError>;
}

/// Real command runner that shells out to the host operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, invocation: &ProcessInvocation) -> Result<CommandOutput, ProcessError> {
        let program = invocation.resolved_program();
        let mut command = Command::new(&program);
        command.args(&invocation.args);
        if let Some(ref dir) = invocation.working_dir {
            if !dir.is_dir() {
                return Err(ProcessError::MissingWorkingDir { path: dir.clone() });
            }
            command.current_dir(dir);
        }
        command.envs(
            invocation
                .env
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );

        tracing::debug!(command = %invocation.command_line(), "spawning external process");
        let output = command.output().map_err(|err| ProcessError::Spawn {
            program,
            message: err.to_string(),
        })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests;
