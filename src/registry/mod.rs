//! Test registry: named cases, skip conditions, and grouped setup.
//!
//! Cases are declared into groups while the suite is built and evaluated
//! sequentially, in declaration order, when the registry runs. A case's skip
//! condition is checked before anything else, so a skipped case triggers
//! neither its group's setup hook nor its body. The setup hook runs at most
//! once per run and its [`GroupContext`] is cloned into each case by value.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::outcome::{CaseError, CaseOutcome};
use crate::report::{CaseReport, RunReport};

/// Body of a test case.
pub type CaseBody = Box<dyn Fn(GroupContext, &mut CaseLog) -> Result<(), CaseError>>;

/// One-time setup hook for a group.
pub type SetupHook = Box<dyn Fn() -> Result<GroupContext, CaseError>>;

/// Errors raised while declaring or selecting cases.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
    /// Raised when two cases resolve to the same full name.
    #[error("a case named `{0}` is already registered")]
    DuplicateCase(String),
    /// Raised when a run selects a case that was never registered.
    #[error("no case named `{0}` is registered")]
    UnknownCase(String),
    /// Raised when a shared case names a scenario missing from the catalog.
    #[error("no shared scenario named `{0}` is available")]
    UnknownScenario(String),
}

/// Precondition that, when it holds, skips a case without judging it.
pub struct SkipCondition {
    predicate: Box<dyn Fn() -> bool>,
    reason: String,
}

impl SkipCondition {
    /// Creates a skip condition; the case is skipped when `predicate` returns
    /// `true`.
    #[must_use]
    pub fn new(predicate: impl Fn() -> bool + 'static, reason: impl Into<String>) -> Self {
        Self {
            predicate: Box::new(predicate),
            reason: reason.into(),
        }
    }

    /// Skips the case unless `path` exists on the local filesystem.
    #[must_use]
    pub fn unless_path_exists(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        let required = path.into();
        Self::new(move || !required.exists(), reason)
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn should_skip(&self) -> bool {
        (self.predicate)()
    }

    /// Reason reported for a skipped case.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl std::fmt::Debug for SkipCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkipCondition")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

/// Fixtures resolved by a group's setup hook.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GroupContext {
    fixtures: BTreeMap<String, Utf8PathBuf>,
}

impl GroupContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named fixture path.
    #[must_use]
    pub fn with_fixture(mut self, name: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        self.fixtures.insert(name.into(), path.into());
        self
    }

    /// Looks up a fixture by name.
    #[must_use]
    pub fn fixture(&self, name: &str) -> Option<&Utf8Path> {
        self.fixtures.get(name).map(Utf8PathBuf::as_path)
    }

    /// Looks up a fixture the caller cannot proceed without.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::MissingFixture`] when no such fixture was resolved.
    pub fn require_fixture(&self, name: &str) -> Result<&Utf8Path, CaseError> {
        self.fixture(name)
            .ok_or_else(|| CaseError::MissingFixture(name.to_owned()))
    }
}

/// Diagnostic lines produced by a case while it runs.
///
/// Each line is also emitted as a `tracing` event so a live run shows the
/// output as it arrives.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CaseLog {
    case: String,
    lines: Vec<String>,
}

impl CaseLog {
    /// Creates an empty log for `case`.
    #[must_use]
    pub fn new(case: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            lines: Vec::new(),
        }
    }

    /// Appends a line to the log.
    pub fn push(&mut self, line: impl Into<String>) {
        let text = line.into();
        info!(case = %self.case, "{text}");
        self.lines.push(text);
    }

    /// Lines recorded so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consumes the log, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// A declared test case.
pub struct TestCase {
    name: String,
    skip: Option<SkipCondition>,
    body: CaseBody,
}

impl TestCase {
    /// Creates a case from its parts.
    pub fn new(
        name: impl Into<String>,
        skip: Option<SkipCondition>,
        body: impl Fn(GroupContext, &mut CaseLog) -> Result<(), CaseError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            skip,
            body: Box::new(body),
        }
    }

    /// Name of the case within its group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

struct Group {
    name: String,
    setup: Option<SetupHook>,
    cases: Vec<TestCase>,
}

impl Group {
    fn full_name(&self, case: &str) -> String {
        if self.name.is_empty() {
            case.to_owned()
        } else {
            format!("{} {case}", self.name)
        }
    }
}

/// Ordered collection of grouped test cases.
#[derive(Default)]
pub struct Registry {
    groups: Vec<Group>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("cases", &self.case_names())
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new group; cases added through the builder are reported as
    /// `"<group> <case>"`.
    pub fn group(&mut self, name: impl Into<String>) -> GroupBuilder<'_> {
        self.groups.push(Group {
            name: name.into(),
            setup: None,
            cases: Vec::new(),
        });
        let index = self.groups.len() - 1;
        GroupBuilder {
            registry: self,
            index,
        }
    }

    /// Registers a standalone case outside any named group.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCase`] when the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        skip: Option<SkipCondition>,
        body: impl Fn(GroupContext, &mut CaseLog) -> Result<(), CaseError> + 'static,
    ) -> Result<(), RegistryError> {
        let case = TestCase::new(name, skip, body);
        self.ensure_unique(&case.name)?;
        self.groups.push(Group {
            name: String::new(),
            setup: None,
            cases: vec![case],
        });
        Ok(())
    }

    /// Full names of all registered cases in declaration order.
    #[must_use]
    pub fn case_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|group| group.cases.iter().map(|case| group.full_name(&case.name)))
            .collect()
    }

    /// Runs a single case by full name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownCase`] when no case has that name.
    pub fn run(&self, name: &str) -> Result<CaseReport, RegistryError> {
        self.run_filtered(|candidate| candidate == name)
            .cases
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::UnknownCase(name.to_owned()))
    }

    /// Runs every case in declaration order.
    #[must_use]
    pub fn run_all(&self) -> RunReport {
        self.run_filtered(|_| true)
    }

    /// Runs the named cases, still in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownCase`] for the first name that matches
    /// nothing; no case runs in that situation.
    pub fn run_selected(&self, names: &[String]) -> Result<RunReport, RegistryError> {
        let known = self.case_names();
        if let Some(missing) = names.iter().find(|name| !known.contains(name)) {
            return Err(RegistryError::UnknownCase(missing.clone()));
        }
        Ok(self.run_filtered(|candidate| names.iter().any(|name| name == candidate)))
    }

    fn run_filtered(&self, select: impl Fn(&str) -> bool) -> RunReport {
        let mut report = RunReport::default();
        for group in &self.groups {
            let mut context: Option<Result<GroupContext, String>> = None;
            for case in &group.cases {
                let full_name = group.full_name(&case.name);
                if !select(&full_name) {
                    continue;
                }
                report.push(Self::run_case(group, case, full_name, &mut context));
            }
        }
        report
    }

    fn run_case(
        group: &Group,
        case: &TestCase,
        full_name: String,
        context: &mut Option<Result<GroupContext, String>>,
    ) -> CaseReport {
        if let Some(ref skip) = case.skip
            && skip.should_skip()
        {
            info!(case = %full_name, reason = skip.reason(), "case skipped");
            return CaseReport::new(full_name, CaseOutcome::Skipped(skip.reason().to_owned()));
        }

        let resolved = context.get_or_insert_with(|| Self::setup_group(group));
        let group_context = match resolved {
            Ok(ready) => ready.clone(),
            Err(message) => {
                return CaseReport::new(
                    full_name,
                    CaseOutcome::Failed(format!("before_all hook failed: {message}")),
                );
            }
        };

        info!(case = %full_name, "case started");
        let mut log = CaseLog::new(full_name.clone());
        let result = catch_unwind(AssertUnwindSafe(|| (case.body)(group_context, &mut log)));
        let outcome = match result {
            Ok(Ok(())) => CaseOutcome::Passed,
            Ok(Err(err)) => CaseOutcome::Failed(err.to_string()),
            Err(payload) => CaseOutcome::Failed(panic_message(payload.as_ref())),
        };
        if outcome.is_failure() {
            warn!(case = %full_name, "case failed");
        } else {
            info!(case = %full_name, "case passed");
        }

        CaseReport::new(full_name, outcome).with_log(log.into_lines())
    }

    fn setup_group(group: &Group) -> Result<GroupContext, String> {
        let Some(ref hook) = group.setup else {
            return Ok(GroupContext::new());
        };
        info!(group = %group.name, "running before_all hook");
        match catch_unwind(AssertUnwindSafe(|| hook())) {
            Ok(Ok(context)) => Ok(context),
            Ok(Err(err)) => Err(err.to_string()),
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }

    fn ensure_unique(&self, full_name: &str) -> Result<(), RegistryError> {
        if self.case_names().iter().any(|name| name == full_name) {
            return Err(RegistryError::DuplicateCase(full_name.to_owned()));
        }
        Ok(())
    }
}

/// Declares cases into one group of a [`Registry`].
#[derive(Debug)]
pub struct GroupBuilder<'a> {
    registry: &'a mut Registry,
    index: usize,
}

impl GroupBuilder<'_> {
    /// Installs the group's one-time setup hook, replacing any previous one.
    #[must_use]
    pub fn before_all(self, hook: impl Fn() -> Result<GroupContext, CaseError> + 'static) -> Self {
        if let Some(group) = self.registry.groups.get_mut(self.index) {
            group.setup = Some(Box::new(hook));
        }
        self
    }

    /// Name of the group being built.
    #[must_use]
    pub fn name(&self) -> &str {
        self.registry
            .groups
            .get(self.index)
            .map_or("", |group| group.name.as_str())
    }

    /// Adds a case to the group.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCase`] when the full name is taken.
    pub fn case(
        &mut self,
        name: impl Into<String>,
        skip: Option<SkipCondition>,
        body: impl Fn(GroupContext, &mut CaseLog) -> Result<(), CaseError> + 'static,
    ) -> Result<&mut Self, RegistryError> {
        let case = TestCase::new(name, skip, body);
        let full_name = self
            .registry
            .groups
            .get(self.index)
            .map_or_else(|| case.name.clone(), |group| group.full_name(&case.name));
        self.registry.ensure_unique(&full_name)?;
        if let Some(group) = self.registry.groups.get_mut(self.index) {
            group.cases.push(case);
        }
        Ok(self)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return format!("case panicked: {message}");
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return format!("case panicked: {message}");
    }
    String::from("case panicked")
}
