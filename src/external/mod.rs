//! Marker-classified external test programs.
//!
//! An [`ExternalCheck`] runs a program in a fixed directory below an anchor
//! path, buffers its output, and fails the case when either stream contains
//! the failure marker. The exit status is deliberately ignored: the
//! wrapped test drivers report failures only through their output.

use camino::{Utf8Path, Utf8PathBuf};

use crate::outcome::{CaseError, CaseOutcome};
use crate::process::{CommandOutput, CommandRunner, ProcessError, ProcessInvocation};
use crate::registry::{CaseLog, GroupContext};

/// Marker printed by JUnit-style runners when any test failed.
pub const FAILURE_MARKER: &str = "FAILURES!!!";

/// Classifies captured output: failed iff it contains `marker`.
///
/// On failure the full output becomes the failure detail.
#[must_use]
pub fn classify(output: &str, marker: &str) -> CaseOutcome {
    if output.contains(marker) {
        CaseOutcome::Failed(output.to_owned())
    } else {
        CaseOutcome::Passed
    }
}

/// Classifies a captured process, scanning stdout and stderr separately so a
/// marker never spans the boundary between them.
///
/// On failure the detail is stdout followed by stderr.
#[must_use]
pub fn classify_output(output: &CommandOutput, marker: &str) -> CaseOutcome {
    if output.stdout.contains(marker) || output.stderr.contains(marker) {
        CaseOutcome::Failed(output.combined())
    } else {
        CaseOutcome::Passed
    }
}

/// An external program whose output decides a case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExternalCheck {
    anchor: Utf8PathBuf,
    relative_dir: Utf8PathBuf,
    program: String,
    args: Vec<String>,
    marker: String,
}

impl ExternalCheck {
    /// Creates a check running `program` inside `anchor/relative_dir`.
    #[must_use]
    pub fn new(
        anchor: impl Into<Utf8PathBuf>,
        relative_dir: impl Into<Utf8PathBuf>,
        program: impl Into<String>,
    ) -> Self {
        Self {
            anchor: anchor.into(),
            relative_dir: relative_dir.into(),
            program: program.into(),
            args: Vec::new(),
            marker: FAILURE_MARKER.to_owned(),
        }
    }

    /// Appends an argument for the program.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Overrides the failure marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Directory the program runs in.
    #[must_use]
    pub fn working_dir(&self) -> Utf8PathBuf {
        if self.relative_dir.is_absolute() {
            return self.relative_dir.clone();
        }
        self.anchor.join(&self.relative_dir)
    }

    /// Marker that classifies output as failed.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Builds the process invocation for this check.
    #[must_use]
    pub fn invocation(&self) -> ProcessInvocation {
        self.args.iter().fold(
            ProcessInvocation::new(self.program.as_str()).working_dir(self.working_dir()),
            |invocation, arg| invocation.arg(arg),
        )
    }

    /// Runs the program to completion and returns stdout followed by stderr.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] when the program cannot be started.
    pub fn run_external<R: CommandRunner>(&self, runner: &R) -> Result<String, ProcessError> {
        self.capture(runner).map(|output| output.combined())
    }

    fn capture<R: CommandRunner>(&self, runner: &R) -> Result<CommandOutput, ProcessError> {
        let invocation = self.invocation();
        tracing::info!(
            command = %invocation.command_line(),
            dir = %self.working_dir(),
            "running external check"
        );
        let output = runner.run(&invocation)?;
        tracing::debug!(status = %output.status_text(), "external check exited");
        Ok(output)
    }

    /// Runs the check as a case body: failures carry the full output, passing
    /// output is forwarded to the case log.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::Failed`] when the marker is present and
    /// [`CaseError::Process`] when the program cannot be started.
    pub fn evaluate<R: CommandRunner>(
        &self,
        runner: &R,
        log: &mut CaseLog,
    ) -> Result<(), CaseError> {
        let output = self.capture(runner)?;
        match classify_output(&output, &self.marker) {
            CaseOutcome::Failed(detail) => Err(CaseError::Failed(detail)),
            CaseOutcome::Passed | CaseOutcome::Skipped(_) => {
                let combined = output.combined();
                if !combined.is_empty() {
                    log.push(combined);
                }
                Ok(())
            }
        }
    }

    /// Converts the check into a registrable case body.
    pub fn into_body<R>(
        self,
        runner: R,
    ) -> impl Fn(GroupContext, &mut CaseLog) -> Result<(), CaseError> + 'static
    where
        R: CommandRunner + 'static,
    {
        move |_context: GroupContext, log: &mut CaseLog| self.evaluate(&runner, log)
    }

    /// Anchor directory the working directory is resolved against.
    #[must_use]
    pub fn anchor(&self) -> &Utf8Path {
        &self.anchor
    }
}
