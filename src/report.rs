//! Run reports and their text/JSON renderings.

use std::io::{self, Write};

use serde::Serialize;

use crate::outcome::CaseOutcome;

/// Outcome of a single case, with any diagnostic output it produced.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CaseReport {
    /// Full case name (`"<group> <case>"`).
    pub name: String,
    /// Result of the case.
    pub outcome: CaseOutcome,
    /// Lines the case forwarded to the run log.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<String>,
}

impl CaseReport {
    /// Creates a report with an empty log.
    #[must_use]
    pub const fn new(name: String, outcome: CaseOutcome) -> Self {
        Self {
            name,
            outcome,
            log: Vec::new(),
        }
    }

    /// Attaches log lines to the report.
    #[must_use]
    pub fn with_log(mut self, log: Vec<String>) -> Self {
        self.log = log;
        self
    }
}

/// Reports for every case a run evaluated, in evaluation order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RunReport {
    /// Per-case reports.
    pub cases: Vec<CaseReport>,
}

/// Output format for [`RunReport::render`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReportFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

impl RunReport {
    /// Appends a case report.
    pub fn push(&mut self, report: CaseReport) {
        self.cases.push(report);
    }

    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::Passed))
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(CaseOutcome::is_failure)
    }

    /// Number of skipped cases.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::Skipped(_)))
    }

    /// Returns `true` when no case failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, predicate: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.cases
            .iter()
            .filter(|case| predicate(&case.outcome))
            .count()
    }

    /// Writes the report in the requested format.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by `target`.
    pub fn render(&self, mut target: impl Write, format: ReportFormat) -> io::Result<()> {
        match format {
            ReportFormat::Text => self.render_text(&mut target),
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut target, self).map_err(io::Error::other)?;
                writeln!(target)
            }
        }
    }

    fn render_text(&self, target: &mut impl Write) -> io::Result<()> {
        for case in &self.cases {
            let label = case.outcome.as_str();
            match case.outcome {
                CaseOutcome::Passed => writeln!(target, "{} ... {label}", case.name)?,
                CaseOutcome::Skipped(ref reason) => {
                    writeln!(target, "{} ... {label} ({reason})", case.name)?;
                }
                CaseOutcome::Failed(ref detail) => {
                    writeln!(target, "{} ... {label}", case.name)?;
                    for line in detail.lines() {
                        writeln!(target, "    {line}")?;
                    }
                }
            }
            for entry in &case.log {
                write!(target, "{entry}")?;
                if !entry.ends_with('\n') {
                    writeln!(target)?;
                }
            }
        }
        writeln!(
            target,
            "\n{} passed; {} failed; {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}
