//! Configuration loading via `ortho-config`.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::scenario::{Hypervisor, ResourceType, UnknownParameter};

/// Default location of the Java XML-RPC client the Java checks need.
pub const DEFAULT_JAVA_CLIENT_JAR: &str = "/usr/share/java/xmlrpc-client.jar";

/// Harness settings derived from defaults, configuration files, and
/// environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "READINESS",
    discovery(
        app_name = "readiness",
        env_var = "READINESS_CONFIG_PATH",
        config_file_name = "readiness.toml",
        dotfile_name = ".readiness.toml",
        project_file_name = "readiness.toml"
    )
)]
pub struct HarnessConfig {
    /// Root the relative suite paths resolve against. Defaults to the current
    /// directory when unset.
    pub anchor_dir: Option<String>,
    /// File whose presence enables the Java checks.
    #[ortho_config(default = DEFAULT_JAVA_CLIENT_JAR.to_owned())]
    pub java_client_jar: String,
    /// Directory, relative to the anchor, holding the Java test driver.
    #[ortho_config(default = "spec/functionality/java/src".to_owned())]
    pub java_src_dir: String,
    /// Java test driver script, resolved inside `java_src_dir`.
    #[ortho_config(default = "./test.sh".to_owned())]
    pub java_test_script: String,
    /// Test class passed to the driver.
    #[ortho_config(default = "TemplateTest".to_owned())]
    pub java_test_class: String,
    /// Directory, relative to the anchor, of the Equinix provider suite.
    #[ortho_config(default = "spec/provision/providers/equinix".to_owned())]
    pub provider_spec_dir: String,
    /// Defaults fixture, relative to `provider_spec_dir`.
    #[ortho_config(default = "../../defaults.yaml".to_owned())]
    pub defaults_file: String,
    /// Provisioning helper, relative to the anchor unless absolute.
    #[ortho_config(default = "spec/provision/provision.sh".to_owned())]
    pub provision_bin: String,
    /// Cleanup helper, relative to the anchor unless absolute.
    #[ortho_config(default = "spec/provision/cleanup.sh".to_owned())]
    pub cleanup_bin: String,
    /// Hypervisor deployed by the Equinix scenario.
    #[ortho_config(default = "kvm".to_owned())]
    pub equinix_hypervisor: String,
    /// Resource type requested from Equinix.
    #[ortho_config(default = "metal".to_owned())]
    pub equinix_resource_type: String,
    /// Comma separated Equinix instance types; one case is declared per entry.
    #[ortho_config(default = "c3.medium".to_owned())]
    pub equinix_instance_types: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(
        description: &'static str,
        env_var: &'static str,
        toml_key: &'static str,
    ) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl HarnessConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to readiness.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("readiness")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and TOML key that supply each value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is blank.
    /// Scenario parameters are parsed later, by the groups that use them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (
                &self.java_client_jar,
                FieldMetadata::new(
                    "Java client JAR",
                    "READINESS_JAVA_CLIENT_JAR",
                    "java_client_jar",
                ),
            ),
            (
                &self.java_src_dir,
                FieldMetadata::new(
                    "Java source directory",
                    "READINESS_JAVA_SRC_DIR",
                    "java_src_dir",
                ),
            ),
            (
                &self.java_test_script,
                FieldMetadata::new(
                    "Java test script",
                    "READINESS_JAVA_TEST_SCRIPT",
                    "java_test_script",
                ),
            ),
            (
                &self.java_test_class,
                FieldMetadata::new(
                    "Java test class",
                    "READINESS_JAVA_TEST_CLASS",
                    "java_test_class",
                ),
            ),
            (
                &self.provider_spec_dir,
                FieldMetadata::new(
                    "provider suite directory",
                    "READINESS_PROVIDER_SPEC_DIR",
                    "provider_spec_dir",
                ),
            ),
            (
                &self.defaults_file,
                FieldMetadata::new(
                    "defaults fixture",
                    "READINESS_DEFAULTS_FILE",
                    "defaults_file",
                ),
            ),
            (
                &self.provision_bin,
                FieldMetadata::new(
                    "provision helper",
                    "READINESS_PROVISION_BIN",
                    "provision_bin",
                ),
            ),
            (
                &self.cleanup_bin,
                FieldMetadata::new("cleanup helper", "READINESS_CLEANUP_BIN", "cleanup_bin"),
            ),
        ];
        for (value, metadata) in &required {
            Self::require_field(value, metadata)?;
        }
        if self.instance_types().is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "missing Equinix instance types: set READINESS_EQUINIX_INSTANCE_TYPES or add \
                 equinix_instance_types to readiness.toml",
            )));
        }
        Ok(())
    }

    /// Absolute anchor directory. A relative `anchor_dir` is joined onto the
    /// process's current directory, and an unset one falls back to it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the current directory cannot be
    /// determined or is not valid UTF-8.
    pub fn anchor(&self) -> Result<Utf8PathBuf, ConfigError> {
        if let Some(ref dir) = self.anchor_dir
            && !dir.trim().is_empty()
        {
            let configured = Utf8PathBuf::from(dir.trim());
            if configured.is_absolute() {
                return Ok(configured);
            }
            return Ok(current_dir()?.join(configured));
        }
        current_dir()
    }

    /// Parsed Equinix hypervisor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unknown values.
    pub fn hypervisor(&self) -> Result<Hypervisor, ConfigError> {
        self.equinix_hypervisor
            .parse()
            .map_err(ConfigError::from)
    }

    /// Parsed Equinix resource type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unknown values.
    pub fn resource_type(&self) -> Result<ResourceType, ConfigError> {
        self.equinix_resource_type
            .parse()
            .map_err(ConfigError::from)
    }

    /// Instance types in declaration order, trimmed, blanks dropped.
    #[must_use]
    pub fn instance_types(&self) -> Vec<String> {
        self.equinix_instance_types
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

fn current_dir() -> Result<Utf8PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|err| ConfigError::Invalid(err.to_string()))?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|path| ConfigError::Invalid(format!("non-UTF-8 directory: {}", path.display())))
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value the harness cannot use.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

impl From<UnknownParameter> for ConfigError {
    fn from(value: UnknownParameter) -> Self {
        Self::Invalid(value.to_string())
    }
}
