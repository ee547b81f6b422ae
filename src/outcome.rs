//! Case outcomes and the errors a case body may raise.

use serde::Serialize;
use thiserror::Error;

use crate::fixture::FixtureError;
use crate::process::ProcessError;

/// Result of evaluating one test case.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum CaseOutcome {
    /// The body ran to completion without error.
    Passed,
    /// The body returned an error or panicked; carries the failure detail.
    Failed(String),
    /// The skip condition held; the body never ran.
    Skipped(String),
}

impl CaseOutcome {
    /// Short label used in text reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "ok",
            Self::Failed(_) => "FAILED",
            Self::Skipped(_) => "skipped",
        }
    }

    /// Returns `true` for [`CaseOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Errors a case body may return. The registry turns every variant into
/// [`CaseOutcome::Failed`] using the error's message.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CaseError {
    /// Explicit failure with a verbatim detail (for example captured output).
    #[error("{0}")]
    Failed(String),
    /// An external process could not be started.
    #[error(transparent)]
    Process(#[from] ProcessError),
    /// A fixture could not be resolved or loaded.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    /// The group context did not provide a fixture the body requires.
    #[error("group context has no fixture named {0}")]
    MissingFixture(String),
}
