//! Unit tests for process invocation helpers.

use super::*;
use rstest::rstest;

#[rstest]
#[case::dot_slash("./test.sh", Some("/srv/java"), "/srv/java/./test.sh")]
#[case::nested("bin/run", Some("/srv"), "/srv/bin/run")]
#[case::bare_name("sh", Some("/srv"), "sh")]
#[case::absolute("/usr/bin/env", Some("/srv"), "/usr/bin/env")]
#[case::no_working_dir("./test.sh", None, "./test.sh")]
#[case::relative_working_dir("./test.sh", Some("spec/functionality/java/src"), "./test.sh")]
fn resolved_program_follows_working_dir(
    #[case] program: &str,
    #[case] dir: Option<&str>,
    #[case] expected: &str,
) {
    let mut invocation = ProcessInvocation::new(program);
    if let Some(path) = dir {
        invocation = invocation.working_dir(path);
    }

    assert_eq!(invocation.resolved_program(), expected);
}

#[test]
fn command_line_escapes_arguments() {
    let invocation = ProcessInvocation::new("./test.sh")
        .arg("TemplateTest")
        .arg("a b");

    assert_eq!(invocation.command_line(), "./test.sh TemplateTest 'a b'");
}

#[test]
fn combined_output_appends_stderr_after_stdout() {
    let output = CommandOutput {
        code: Some(1),
        stdout: String::from("out\n"),
        stderr: String::from("err\n"),
    };

    assert_eq!(output.combined(), "out\nerr\n");
    assert!(!output.is_success());
    assert_eq!(output.status_text(), "1");
}

#[test]
fn status_text_reports_unknown_without_code() {
    let output = CommandOutput::default();
    assert_eq!(output.status_text(), "unknown");
}

#[test]
fn process_runner_rejects_missing_working_dir() {
    let invocation = ProcessInvocation::new("true").working_dir("/nonexistent/readiness-dir");

    let err = ProcessCommandRunner
        .run(&invocation)
        .expect_err("missing directory should fail");

    assert!(
        matches!(err, ProcessError::MissingWorkingDir { ref path } if path.as_str() == "/nonexistent/readiness-dir"),
        "unexpected error: {err}"
    );
}

#[rstest]
#[case::missing_directory("./test.sh", "/nonexistent/readiness-dir")]
#[case::missing_program("./test.sh", "/")]
fn failed_spawn_leaves_current_directory_unchanged(#[case] program: &str, #[case] dir: &str) {
    let before = std::env::current_dir().expect("current dir");
    let invocation = ProcessInvocation::new(program).working_dir(dir);

    let result = ProcessCommandRunner.run(&invocation);

    assert!(result.is_err(), "spawn should fail: {result:?}");
    assert_eq!(std::env::current_dir().expect("current dir"), before);
}

#[cfg(unix)]
#[test]
fn process_runner_captures_both_streams() {
    let invocation = ProcessInvocation::new("sh")
        .arg("-c")
        .arg("echo out; echo err 1>&2; exit 3");

    let output = ProcessCommandRunner.run(&invocation).expect("sh should run");

    assert_eq!(output.code, Some(3));
    assert_eq!(output.stdout, "out\n");
    assert_eq!(output.stderr, "err\n");
}

#[cfg(unix)]
#[test]
fn process_runner_passes_environment() {
    let invocation = ProcessInvocation::new("sh")
        .arg("-c")
        .arg("printf %s \"$READINESS_HYPERVISOR\"")
        .env("READINESS_HYPERVISOR", "kvm");

    let output = ProcessCommandRunner.run(&invocation).expect("sh should run");

    assert_eq!(output.stdout, "kvm");
}
