//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::process::{CommandOutput, CommandRunner, ProcessError, ProcessInvocation};

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
/// Clones share the same queue and invocation log.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<Result<CommandOutput, ProcessError>>>>,
    invocations: Rc<RefCell<Vec<ProcessInvocation>>>,
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<ProcessInvocation> {
        self.invocations.borrow().clone()
    }

    /// Number of invocations recorded so far.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.invocations.borrow().len()
    }

    /// Pushes a successful exit status with no output.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a specific exit code with no output.
    pub fn push_exit_code(&self, code: i32) {
        self.push_output(Some(code), "", "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32) {
        self.push_output(Some(code), "", "simulated failure");
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(Ok(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }));
    }

    /// Pushes a spawn failure.
    pub fn push_spawn_error(&self, message: impl Into<String>) {
        self.responses
            .borrow_mut()
            .push_back(Err(ProcessError::Spawn {
                program: String::from("scripted"),
                message: message.into(),
            }));
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &ProcessInvocation) -> Result<CommandOutput, ProcessError> {
        self.invocations.borrow_mut().push(invocation.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProcessError::Spawn {
                    program: invocation.program.clone(),
                    message: String::from("no scripted response available"),
                })
            })
    }
}

/// Writes an executable shell script, used by tests that spawn real helpers.
///
/// # Errors
///
/// Returns any I/O error raised while writing the file or setting its mode.
#[cfg(unix)]
pub fn write_script(path: &camino::Utf8Path, body: &str) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt as _;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("#!/bin/sh\n{body}\n"))?;
    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(path, permissions)
}
