//! Shared fixtures for readiness suite behavioural tests.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use readiness::test_support::write_script;
use readiness::{HarnessConfig, RunReport};
use rstest::fixture;
use tempfile::TempDir;

pub const JAVA_SRC_DIR: &str = "spec/functionality/java/src";
pub const HELPER_LOG: &str = "spec/provision/helpers.log";

/// Scratch checkout laid out like the real readiness tree.
#[derive(Clone, Debug)]
pub struct SuiteContext {
    pub root: Utf8PathBuf,
    pub config: HarnessConfig,
    pub cwd_before: PathBuf,
    pub report: Option<RunReport>,
    _tmp: Arc<TempDir>,
}

impl SuiteContext {
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    pub fn write_java_driver(&self, output: &str) {
        let body = format!("echo \"running $1\"\nprintf '%s\\n' '{output}'");
        write_script(&self.path(JAVA_SRC_DIR).join("test.sh"), &body)
            .unwrap_or_else(|err| panic!("write Java driver: {err}"));
    }

    pub fn write_helper(&self, name: &str, tail: &str) {
        let body = format!(
            "echo \"{name} $READINESS_INSTANCE\" >> \"$(dirname \"$0\")/helpers.log\"\n{tail}"
        );
        write_script(&self.path("spec/provision").join(name), &body)
            .unwrap_or_else(|err| panic!("write {name} helper: {err}"));
    }

    pub fn helper_log(&self) -> Vec<String> {
        fs::read_to_string(self.path(HELPER_LOG))
            .map(|text| text.lines().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

fn build_suite_context() -> SuiteContext {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("create workspace: {err}"));
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("workspace path is not UTF-8: {}", path.display()));
    let cwd_before =
        std::env::current_dir().unwrap_or_else(|err| panic!("read current directory: {err}"));

    fs::create_dir_all(root.join("spec/provision/providers/equinix"))
        .unwrap_or_else(|err| panic!("create provider directory: {err}"));
    fs::write(
        root.join("spec/provision/defaults.yaml"),
        "inputs:\n  equinix_plan: c3.medium\n  equinix_metro: da\n",
    )
    .unwrap_or_else(|err| panic!("write defaults fixture: {err}"));

    let config = HarnessConfig {
        anchor_dir: Some(root.to_string()),
        java_client_jar: root.join("missing/xmlrpc-client.jar").into_string(),
        java_src_dir: String::from(JAVA_SRC_DIR),
        java_test_script: String::from("./test.sh"),
        java_test_class: String::from("TemplateTest"),
        provider_spec_dir: String::from("spec/provision/providers/equinix"),
        defaults_file: String::from("../../defaults.yaml"),
        provision_bin: String::from("spec/provision/provision.sh"),
        cleanup_bin: String::from("spec/provision/cleanup.sh"),
        equinix_hypervisor: String::from("kvm"),
        equinix_resource_type: String::from("metal"),
        equinix_instance_types: String::from("c3.medium"),
    };

    let context = SuiteContext {
        root,
        config,
        cwd_before,
        report: None,
        _tmp: Arc::new(tmp),
    };
    context.write_java_driver("OK (1 test)");
    context.write_helper("provision.sh", "exit 0");
    context.write_helper("cleanup.sh", "exit 0");
    context
}

#[fixture]
pub fn suite_context() -> SuiteContext {
    build_suite_context()
}
