//! Shared, parameterised scenarios.
//!
//! A shared scenario is a reusable case body looked up by name and bound to
//! literal [`ScenarioParameters`]. Declaring one registers exactly one case
//! per parameter set; the scenario itself owns provisioning, teardown, and
//! assertions. No check is made here that a combination of parameters makes
//! sense for the provider.

use std::collections::BTreeMap;
use std::rc::Rc;

use camino::Utf8PathBuf;

use crate::fixture::resolve_fixture;
use crate::outcome::CaseError;
use crate::registry::{CaseLog, GroupBuilder, GroupContext, RegistryError};

mod types;

pub use types::{Hypervisor, Provider, ResourceType, ScenarioParameters, UnknownParameter};

/// Group context key under which the resolved `defaults.yaml` path lives.
pub const DEFAULTS_FIXTURE: &str = "defaults_yaml";

/// Reusable scenario body.
pub trait SharedScenario {
    /// Name the scenario is declared under (for example `equinix_provision`).
    fn name(&self) -> &str;

    /// Runs the scenario for one parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] when the scenario fails.
    fn run(
        &self,
        params: &ScenarioParameters,
        context: &GroupContext,
        log: &mut CaseLog,
    ) -> Result<(), CaseError>;
}

/// Scenarios available for declaration, keyed by name.
#[derive(Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<String, Rc<dyn SharedScenario>>,
}

impl std::fmt::Debug for ScenarioCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioCatalog")
            .field("scenarios", &self.scenarios.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScenarioCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scenario, replacing any scenario of the same name.
    pub fn insert(&mut self, scenario: impl SharedScenario + 'static) {
        self.scenarios
            .insert(scenario.name().to_owned(), Rc::new(scenario));
    }

    /// Looks up a scenario by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<dyn SharedScenario>> {
        self.scenarios.get(name).cloned()
    }

    /// Names of the available scenarios.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }
}

/// Case name used for a shared scenario instance.
#[must_use]
pub fn shared_case_name(scenario_name: &str, params: &ScenarioParameters) -> String {
    format!("behaves like {scenario_name} [{params}]")
}

/// Registers one case running `scenario_name` bound to `params`.
///
/// The parameters move into the case body, so two declarations never share
/// parameter state. Returns the case name within the group.
///
/// # Errors
///
/// Returns [`RegistryError::UnknownScenario`] when the catalog has no such
/// scenario and [`RegistryError::DuplicateCase`] when the same parameters were
/// already declared in the group.
pub fn declare_shared_case(
    group: &mut GroupBuilder<'_>,
    catalog: &ScenarioCatalog,
    scenario_name: &str,
    params: ScenarioParameters,
) -> Result<String, RegistryError> {
    let scenario = catalog
        .get(scenario_name)
        .ok_or_else(|| RegistryError::UnknownScenario(scenario_name.to_owned()))?;
    let name = shared_case_name(scenario_name, &params);
    tracing::debug!(group = group.name(), case = %name, "declaring shared case");
    group.case(
        name.clone(),
        None,
        move |context: GroupContext, log: &mut CaseLog| scenario.run(&params, &context, log),
    )?;
    Ok(name)
}

/// Builds a `before_all` hook that resolves the defaults fixture relative to
/// `anchor` and publishes it under [`DEFAULTS_FIXTURE`].
pub fn defaults_fixture_hook(
    anchor: Utf8PathBuf,
    relative: Utf8PathBuf,
) -> impl Fn() -> Result<GroupContext, CaseError> + 'static {
    move || {
        let resolved = resolve_fixture(&anchor, &relative)?;
        tracing::debug!(fixture = %resolved, "resolved defaults fixture");
        Ok(GroupContext::new().with_fixture(DEFAULTS_FIXTURE, resolved))
    }
}
