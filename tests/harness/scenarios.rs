//! BDD scenarios for the readiness suite.

use rstest_bdd_macros::scenario;

use super::test_helpers::{SuiteContext, suite_context};

#[scenario(
    path = "tests/features/readiness.feature",
    name = "Skip the Java check when the client libraries are missing"
)]
fn scenario_java_skipped(suite_context: SuiteContext) {
    let _ = suite_context;
}

#[scenario(
    path = "tests/features/readiness.feature",
    name = "Fail the Java check when the driver reports failures"
)]
fn scenario_java_failure_marker(suite_context: SuiteContext) {
    let _ = suite_context;
}

#[scenario(
    path = "tests/features/readiness.feature",
    name = "Pass the Java check when the driver output is clean"
)]
fn scenario_java_passes(suite_context: SuiteContext) {
    let _ = suite_context;
}

#[scenario(
    path = "tests/features/readiness.feature",
    name = "Fail the Java check when the driver cannot start"
)]
fn scenario_java_driver_missing(suite_context: SuiteContext) {
    let _ = suite_context;
}

#[scenario(
    path = "tests/features/readiness.feature",
    name = "Provision Equinix hosts from the shared defaults"
)]
fn scenario_equinix_provision(suite_context: SuiteContext) {
    let _ = suite_context;
}

#[scenario(
    path = "tests/features/readiness.feature",
    name = "Clean up after a failed provision"
)]
fn scenario_equinix_cleanup(suite_context: SuiteContext) {
    let _ = suite_context;
}
