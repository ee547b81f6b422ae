//! Provider provisioning scenarios backed by external helpers.
//!
//! The provisioning and cleanup helpers are opaque executables. A scenario
//! hands them the bound parameters and the resolved defaults fixture through
//! the environment, runs `provision`, and then always runs `cleanup`, even
//! when provisioning failed.

use crate::fixture::load_defaults;
use crate::outcome::CaseError;
use crate::process::{CommandOutput, CommandRunner, ProcessError, ProcessInvocation};
use crate::registry::{CaseLog, GroupContext};
use crate::scenario::{DEFAULTS_FIXTURE, ScenarioParameters, SharedScenario};

/// Environment variable carrying the provider name.
pub const PROVIDER_ENV: &str = "READINESS_PROVIDER";
/// Environment variable carrying the hypervisor.
pub const HYPERVISOR_ENV: &str = "READINESS_HYPERVISOR";
/// Environment variable carrying the resource type.
pub const RESOURCE_TYPE_ENV: &str = "READINESS_RESOURCE_TYPE";
/// Environment variable carrying the instance type.
pub const INSTANCE_ENV: &str = "READINESS_INSTANCE";
/// Environment variable carrying the absolute `defaults.yaml` path.
pub const DEFAULTS_YAML_ENV: &str = "READINESS_DEFAULTS_YAML";

/// Helper invocations wrapped around a provisioning scenario.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProvisionHooks {
    /// Brings up the hosts.
    pub provision: ProcessInvocation,
    /// Tears them down again.
    pub cleanup: ProcessInvocation,
}

/// Shared scenario that delegates to the provision and cleanup helpers.
#[derive(Clone, Debug)]
pub struct ExternalProvisionScenario<R> {
    name: String,
    hooks: ProvisionHooks,
    runner: R,
}

impl<R: CommandRunner> ExternalProvisionScenario<R> {
    /// Creates a scenario declared under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, hooks: ProvisionHooks, runner: R) -> Self {
        Self {
            name: name.into(),
            hooks,
            runner,
        }
    }

    fn bind(invocation: &ProcessInvocation, env: &[(&str, String)]) -> ProcessInvocation {
        env.iter()
            .fold(invocation.clone(), |bound, (key, value)| {
                bound.env(*key, value.as_str())
            })
    }

    fn run_stage(
        &self,
        stage: &str,
        invocation: &ProcessInvocation,
        log: &mut CaseLog,
    ) -> Result<(), String> {
        tracing::info!(stage, command = %invocation.command_line(), "running provisioning helper");
        match self.runner.run(invocation) {
            Ok(output) if output.is_success() => {
                forward_output(&output, log);
                Ok(())
            }
            Ok(output) => Err(stage_failure(stage, &output)),
            Err(err) => Err(spawn_failure(stage, &err)),
        }
    }
}

impl<R: CommandRunner> SharedScenario for ExternalProvisionScenario<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(
        &self,
        params: &ScenarioParameters,
        context: &GroupContext,
        log: &mut CaseLog,
    ) -> Result<(), CaseError> {
        let defaults_path = context.require_fixture(DEFAULTS_FIXTURE)?;
        let defaults = load_defaults(defaults_path)?;
        log.push(format!(
            "loaded {} provisioning defaults from {}",
            defaults.len(),
            defaults.path()
        ));

        let env = [
            (PROVIDER_ENV, params.provider.to_string()),
            (HYPERVISOR_ENV, params.hypervisor.to_string()),
            (RESOURCE_TYPE_ENV, params.resource_type.to_string()),
            (INSTANCE_ENV, params.instance_type.clone()),
            (DEFAULTS_YAML_ENV, defaults_path.to_string()),
        ];
        let provision = Self::bind(&self.hooks.provision, &env);
        let cleanup = Self::bind(&self.hooks.cleanup, &env);

        let provisioned = self.run_stage("provision", &provision, log);
        let cleaned = self.run_stage("cleanup", &cleanup, log);

        match (provisioned, cleaned) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(message), cleanup_result) => Err(CaseError::Failed(append_cleanup_note(
                message,
                cleanup_result.err().as_deref(),
            ))),
            (Ok(()), Err(message)) => Err(CaseError::Failed(message)),
        }
    }
}

fn forward_output(output: &CommandOutput, log: &mut CaseLog) {
    let combined = output.combined();
    if !combined.is_empty() {
        log.push(combined);
    }
}

fn stage_failure(stage: &str, output: &CommandOutput) -> String {
    format!(
        "{stage} exited with status {}:\n{}",
        output.status_text(),
        output.combined()
    )
}

fn spawn_failure(stage: &str, err: &ProcessError) -> String {
    format!("{stage} could not start: {err}")
}

fn append_cleanup_note(message: String, cleanup_error: Option<&str>) -> String {
    match cleanup_error {
        Some(cleanup) => format!("{message} (cleanup also failed: {cleanup})"),
        None => message,
    }
}
