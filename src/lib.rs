//! Core library for the `readiness` acceptance harness.
//!
//! The crate exposes a small test registry with skip conditions and grouped
//! one-time setup, an adapter that judges external test drivers by scanning
//! their output for a failure marker, and parameterized shared scenarios that
//! provision provider hosts through external helpers.

pub mod config;
pub mod external;
pub mod fixture;
pub mod outcome;
pub mod process;
pub mod provision;
pub mod registry;
pub mod report;
pub mod scenario;
pub mod suite;
pub mod test_support;

pub use config::{ConfigError, HarnessConfig};
pub use external::{ExternalCheck, FAILURE_MARKER, classify, classify_output};
pub use fixture::{FixtureError, ProvisionDefaults, load_defaults, resolve_fixture};
pub use outcome::{CaseError, CaseOutcome};
pub use process::{
    CommandOutput, CommandRunner, ProcessCommandRunner, ProcessError, ProcessInvocation,
};
pub use provision::{ExternalProvisionScenario, ProvisionHooks};
pub use registry::{
    CaseLog, GroupBuilder, GroupContext, Registry, RegistryError, SkipCondition, TestCase,
};
pub use report::{CaseReport, ReportFormat, RunReport};
pub use scenario::{
    Hypervisor, Provider, ResourceType, ScenarioCatalog, ScenarioParameters, SharedScenario,
    declare_shared_case,
};
pub use suite::{SuiteError, readiness_suite};
