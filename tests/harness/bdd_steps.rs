//! BDD step definitions for the readiness suite.

use std::fs;

use readiness::{CaseOutcome, CaseReport, ProcessCommandRunner, readiness_suite};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{JAVA_SRC_DIR, SuiteContext};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
    #[error("failed to prepare workspace: {0}")]
    Setup(String),
    #[error("failed to run suite: {0}")]
    Suite(String),
}

fn find_case<'a>(suite_context: &'a SuiteContext, name: &str) -> Result<&'a CaseReport, StepError> {
    let report = suite_context
        .report
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("the suite has not run")))?;
    report
        .cases
        .iter()
        .find(|case| case.name == name)
        .ok_or_else(|| StepError::Assertion(format!("no report for case `{name}`")))
}

#[given("a readiness workspace")]
fn readiness_workspace(suite_context: SuiteContext) -> SuiteContext {
    suite_context
}

#[given("the Java client libraries are missing")]
fn java_libraries_missing(suite_context: SuiteContext) -> SuiteContext {
    suite_context
}

#[given("the Java client libraries are installed")]
fn java_libraries_installed(mut suite_context: SuiteContext) -> Result<SuiteContext, StepError> {
    let jar = suite_context.path("usr/share/java/xmlrpc-client.jar");
    if let Some(parent) = jar.parent() {
        fs::create_dir_all(parent).map_err(|err| StepError::Setup(err.to_string()))?;
    }
    fs::write(&jar, b"").map_err(|err| StepError::Setup(err.to_string()))?;
    suite_context.config.java_client_jar = jar.into_string();
    Ok(suite_context)
}

#[given("the Java driver prints \"{output}\"")]
fn java_driver_prints(suite_context: SuiteContext, output: String) -> SuiteContext {
    suite_context.write_java_driver(&output);
    suite_context
}

#[given("the Java driver is missing")]
fn java_driver_missing(suite_context: SuiteContext) -> Result<SuiteContext, StepError> {
    fs::remove_file(suite_context.path(JAVA_SRC_DIR).join("test.sh"))
        .map_err(|err| StepError::Setup(err.to_string()))?;
    Ok(suite_context)
}

#[given("the provision helper fails with \"{message}\"")]
fn provision_helper_fails(suite_context: SuiteContext, message: String) -> SuiteContext {
    suite_context.write_helper("provision.sh", &format!("echo '{message}' >&2\nexit 1"));
    suite_context
}

#[when("I run the case \"{name}\"")]
fn run_case(mut suite_context: SuiteContext, name: String) -> Result<SuiteContext, StepError> {
    let registry = readiness_suite(&suite_context.config, ProcessCommandRunner)
        .map_err(|err| StepError::Suite(err.to_string()))?;
    let report = registry
        .run_selected(&[name])
        .map_err(|err| StepError::Suite(err.to_string()))?;
    suite_context.report = Some(report);
    Ok(suite_context)
}

#[then("the case \"{name}\" is skipped with reason \"{reason}\"")]
fn case_skipped(suite_context: &SuiteContext, name: String, reason: String) -> Result<(), StepError> {
    let case = find_case(suite_context, &name)?;
    if case.outcome != CaseOutcome::Skipped(reason.clone()) {
        return Err(StepError::Assertion(format!(
            "expected `{name}` to be skipped with `{reason}`, got {:?}",
            case.outcome
        )));
    }
    Ok(())
}

#[then("the case \"{name}\" fails with detail containing \"{snippet}\"")]
fn case_fails(suite_context: &SuiteContext, name: String, snippet: String) -> Result<(), StepError> {
    let case = find_case(suite_context, &name)?;
    match case.outcome {
        CaseOutcome::Failed(ref detail) if detail.contains(&snippet) => Ok(()),
        ref other => Err(StepError::Assertion(format!(
            "expected `{name}` to fail mentioning `{snippet}`, got {other:?}"
        ))),
    }
}

#[then("the case \"{name}\" passes")]
fn case_passes(suite_context: &SuiteContext, name: String) -> Result<(), StepError> {
    let case = find_case(suite_context, &name)?;
    if case.outcome != CaseOutcome::Passed {
        return Err(StepError::Assertion(format!(
            "expected `{name}` to pass, got {:?}",
            case.outcome
        )));
    }
    Ok(())
}

#[then("the case \"{name}\" logged \"{text}\"")]
fn case_logged(suite_context: &SuiteContext, name: String, text: String) -> Result<(), StepError> {
    let case = find_case(suite_context, &name)?;
    if !case.log.iter().any(|line| line.contains(&text)) {
        return Err(StepError::Assertion(format!(
            "expected `{name}` log to contain `{text}`, got {:?}",
            case.log
        )));
    }
    Ok(())
}

#[then("the working directory is unchanged")]
fn working_directory_unchanged(suite_context: &SuiteContext) -> Result<(), StepError> {
    let cwd = std::env::current_dir().map_err(|err| StepError::Assertion(err.to_string()))?;
    if cwd != suite_context.cwd_before {
        return Err(StepError::Assertion(format!(
            "working directory moved from {} to {}",
            suite_context.cwd_before.display(),
            cwd.display()
        )));
    }
    Ok(())
}

#[then("the helpers ran \"{calls}\"")]
fn helpers_ran(suite_context: &SuiteContext, calls: String) -> Result<(), StepError> {
    let expected: Vec<String> = calls.split(',').map(str::to_owned).collect();
    let actual = suite_context.helper_log();
    if actual != expected {
        return Err(StepError::Assertion(format!(
            "expected helper calls {expected:?}, got {actual:?}"
        )));
    }
    Ok(())
}
