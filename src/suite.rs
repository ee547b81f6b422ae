//! The readiness suite: Java functionality checks and provider provisioning.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::config::{ConfigError, HarnessConfig};
use crate::external::ExternalCheck;
use crate::process::{CommandRunner, ProcessInvocation};
use crate::provision::{ExternalProvisionScenario, ProvisionHooks};
use crate::outcome::CaseError;
use crate::registry::{CaseLog, GroupContext, Registry, RegistryError, SkipCondition};
use crate::scenario::{
    Provider, ScenarioCatalog, ScenarioParameters, declare_shared_case, defaults_fixture_hook,
};

/// Group holding the Java template check.
pub const JAVA_GROUP: &str = "Template java test";
/// Name of the Java template case.
pub const JAVA_CASE: &str = "Template";
/// Reason reported when the Java client libraries are absent.
pub const JAVA_SKIP_REASON: &str = "Java libraries not installed";
/// Shared scenario provisioning Equinix hosts.
pub const EQUINIX_SCENARIO: &str = "equinix_provision";

/// Errors raised while assembling the suite.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SuiteError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A case could not be declared.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Builds the readiness suite from configuration.
///
/// # Errors
///
/// Returns [`SuiteError`] when the configuration is invalid or a case cannot
/// be declared.
pub fn readiness_suite<R>(config: &HarnessConfig, runner: R) -> Result<Registry, SuiteError>
where
    R: CommandRunner + Clone + 'static,
{
    config.validate()?;
    let anchor = config.anchor()?;
    let mut registry = Registry::new();

    declare_java_checks(&mut registry, config, &anchor, runner.clone())?;
    declare_equinix_provisioning(&mut registry, config, &anchor, runner)?;

    Ok(registry)
}

/// Name of the Equinix group for a hypervisor (for example
/// `Equinix provision [KVM]`).
#[must_use]
pub fn equinix_group_name(hypervisor: &str) -> String {
    format!("Equinix provision [{}]", hypervisor.to_ascii_uppercase())
}

fn declare_java_checks<R>(
    registry: &mut Registry,
    config: &HarnessConfig,
    anchor: &Utf8Path,
    runner: R,
) -> Result<(), SuiteError>
where
    R: CommandRunner + 'static,
{
    let check = ExternalCheck::new(
        anchor,
        config.java_src_dir.as_str(),
        config.java_test_script.as_str(),
    )
    .arg(config.java_test_class.as_str());
    registry.group(JAVA_GROUP).case(
        JAVA_CASE,
        Some(SkipCondition::unless_path_exists(
            config.java_client_jar.as_str(),
            JAVA_SKIP_REASON,
        )),
        check.into_body(runner),
    )?;
    Ok(())
}

fn declare_equinix_provisioning<R>(
    registry: &mut Registry,
    config: &HarnessConfig,
    anchor: &Utf8Path,
    runner: R,
) -> Result<(), SuiteError>
where
    R: CommandRunner + 'static,
{
    let (hypervisor, resource_type) = match (config.hypervisor(), config.resource_type()) {
        (Ok(hypervisor), Ok(resource_type)) => (hypervisor, resource_type),
        (Err(err), _) | (_, Err(err)) => {
            declare_unusable_equinix_cases(registry, config, &err.to_string())?;
            return Ok(());
        }
    };

    let hooks = ProvisionHooks {
        provision: helper_invocation(anchor, &config.provision_bin),
        cleanup: helper_invocation(anchor, &config.cleanup_bin),
    };
    let mut catalog = ScenarioCatalog::new();
    catalog.insert(ExternalProvisionScenario::new(EQUINIX_SCENARIO, hooks, runner));

    let provider_dir = resolve_against(anchor, &config.provider_spec_dir);
    let mut group = registry
        .group(equinix_group_name(hypervisor.as_str()))
        .before_all(defaults_fixture_hook(
            provider_dir,
            Utf8PathBuf::from(config.defaults_file.as_str()),
        ));
    for instance_type in config.instance_types() {
        let params =
            ScenarioParameters::new(Provider::Equinix, hypervisor, resource_type, instance_type);
        declare_shared_case(&mut group, &catalog, EQUINIX_SCENARIO, params)?;
    }
    Ok(())
}

/// Declares the Equinix cases so that each fails with `message`; the rest of
/// the suite stays runnable when the scenario parameters cannot be parsed.
fn declare_unusable_equinix_cases(
    registry: &mut Registry,
    config: &HarnessConfig,
    message: &str,
) -> Result<(), SuiteError> {
    let hypervisor = config.equinix_hypervisor.trim();
    let resource_type = config.equinix_resource_type.trim();
    tracing::warn!(hypervisor, resource_type, error = message, "invalid Equinix parameters");
    let mut group = registry.group(equinix_group_name(hypervisor));
    for instance_type in config.instance_types() {
        let detail = message.to_owned();
        group.case(
            format!("behaves like {EQUINIX_SCENARIO} [{hypervisor} {resource_type} {instance_type}]"),
            None,
            move |_context: GroupContext, _log: &mut CaseLog| {
                Err(CaseError::Failed(detail.clone()))
            },
        )?;
    }
    Ok(())
}

fn helper_invocation(anchor: &Utf8Path, program: &str) -> ProcessInvocation {
    ProcessInvocation::new(resolve_against(anchor, program).into_string()).working_dir(anchor)
}

fn resolve_against(anchor: &Utf8Path, path: &str) -> Utf8PathBuf {
    let candidate = Utf8Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        anchor.join(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::CaseOutcome;
    use crate::test_support::ScriptedRunner;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> HarnessConfig {
        HarnessConfig {
            anchor_dir: Some(String::from("/opt/readiness")),
            java_client_jar: String::from("/nonexistent/readiness/xmlrpc-client.jar"),
            java_src_dir: String::from("spec/functionality/java/src"),
            java_test_script: String::from("./test.sh"),
            java_test_class: String::from("TemplateTest"),
            provider_spec_dir: String::from("spec/provision/providers/equinix"),
            defaults_file: String::from("../../defaults.yaml"),
            provision_bin: String::from("spec/provision/provision.sh"),
            cleanup_bin: String::from("/usr/local/bin/cleanup"),
            equinix_hypervisor: String::from("kvm"),
            equinix_resource_type: String::from("metal"),
            equinix_instance_types: String::from("c3.medium"),
        }
    }

    #[rstest]
    fn suite_declares_java_and_equinix_cases(config: HarnessConfig) {
        let registry = readiness_suite(&config, ScriptedRunner::new()).expect("suite");

        assert_eq!(
            registry.case_names(),
            vec![
                String::from("Template java test Template"),
                String::from(
                    "Equinix provision [KVM] behaves like equinix_provision [kvm metal c3.medium]"
                ),
            ]
        );
    }

    #[rstest]
    fn each_instance_type_gets_its_own_case(mut config: HarnessConfig) {
        config.equinix_instance_types = String::from("c3.medium, c3.large");

        let registry = readiness_suite(&config, ScriptedRunner::new()).expect("suite");

        assert_eq!(registry.case_names().len(), 3);
    }

    #[rstest]
    fn missing_java_jar_skips_without_running(config: HarnessConfig) {
        let runner = ScriptedRunner::new();
        let registry = readiness_suite(&config, runner.clone()).expect("suite");

        let report = registry.run("Template java test Template").expect("case");

        assert_eq!(
            report.outcome,
            CaseOutcome::Skipped(String::from(JAVA_SKIP_REASON))
        );
        assert_eq!(runner.invocation_count(), 0);
    }

    #[rstest]
    #[case::hypervisor("equinix_hypervisor", "vmware", "unknown hypervisor `vmware`")]
    #[case::resource_type("equinix_resource_type", "container", "unknown resource type `container`")]
    fn invalid_parameters_fail_only_the_equinix_cases(
        mut config: HarnessConfig,
        #[case] field: &str,
        #[case] value: &str,
        #[case] message: &str,
    ) {
        match field {
            "equinix_hypervisor" => config.equinix_hypervisor = value.to_owned(),
            _ => config.equinix_resource_type = value.to_owned(),
        }
        let runner = ScriptedRunner::new();
        let registry = readiness_suite(&config, runner.clone()).expect("suite");

        let report = registry.run_all();

        let outcomes: Vec<(&str, &CaseOutcome)> = report
            .cases
            .iter()
            .map(|case| (case.name.as_str(), &case.outcome))
            .collect();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes.first(),
            Some(&(
                "Template java test Template",
                &CaseOutcome::Skipped(String::from(JAVA_SKIP_REASON))
            ))
        );
        let equinix = outcomes.get(1).expect("equinix case");
        assert!(equinix.0.starts_with("Equinix provision ["), "{}", equinix.0);
        assert_eq!(
            equinix.1,
            &CaseOutcome::Failed(format!("invalid configuration: {message}"))
        );
        assert_eq!(runner.invocation_count(), 0);
    }

    #[test]
    fn helper_paths_resolve_against_anchor() {
        let anchor = Utf8Path::new("/opt/readiness");
        assert_eq!(
            helper_invocation(anchor, "spec/provision/provision.sh").program,
            "/opt/readiness/spec/provision/provision.sh"
        );
        assert_eq!(
            helper_invocation(anchor, "/usr/local/bin/cleanup").program,
            "/usr/local/bin/cleanup"
        );
    }
}
