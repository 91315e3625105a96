mod common;

use common::test_prelude::*;
#[cfg(unix)]
use common::test_utils::TestProject;

#[test]
fn list_patterns_prints_the_builtin_catalog() {
    let mut cmd = Command::cargo_bin("e-buildconsole").unwrap();
    cmd.arg("--list-patterns")
        .assert()
        .success()
        .stdout(contains("*:make:Enter:"))
        .stdout(contains("c:gcc:Error:"))
        .stdout(contains("rust:rustc:Warning:"));
}

#[test]
fn list_patterns_includes_command_line_patterns() {
    let mut cmd = Command::cargo_bin("e-buildconsole").unwrap();
    cmd.args(["-p", r"c:mine:Error:^MINE (?P<message>.*)$", "--list-patterns"])
        .assert()
        .success()
        .stdout(contains("c:mine:Error:^MINE (?P<message>.*)$"));
}

#[test]
fn print_config_shows_defaults() {
    let mut cmd = Command::cargo_bin("e-buildconsole").unwrap();
    cmd.arg("--print-config")
        .assert()
        .success()
        .stdout(contains("indicator_capacity = 16"))
        .stdout(contains("auto_show_first_error = true"));
}

#[test]
fn missing_command_fails() {
    let mut cmd = Command::cargo_bin("e-buildconsole").unwrap();
    cmd.assert()
        .failure()
        .stderr(contains("no build command given"));
}

#[cfg(unix)]
#[test]
fn summary_lists_diagnostics_and_keeps_exit_code() {
    let project = TestProject::new("build").unwrap();
    let script = "printf 'make: Entering directory '\\''/src/lib'\\''\\n\
                  main.c:10:3: error: missing semicolon\\n\
                  main.c:4: warning: unused x\\n'; exit 3";

    let mut cmd = Command::cargo_bin("e-buildconsole").unwrap();
    cmd.arg("--cwd")
        .arg(project.path())
        .args(["--no-color", "--summary", "--", "sh", "-c", script])
        .assert()
        .code(3)
        .stdout(contains("main.c:10:3: error: missing semicolon"))
        .stdout(contains("Process finished with exit code 3"))
        .stdout(contains("Errors (1)"))
        .stdout(contains("  main.c:10:3: missing semicolon"))
        .stdout(contains("Warnings (1)"));
}

#[cfg(unix)]
#[test]
fn json_report_nests_extensions() {
    let project = TestProject::new("json").unwrap();
    let script = "echo 'a.c:2:1: error: bad'; echo 'a.c:1:1: note: see here'";

    let mut cmd = Command::cargo_bin("e-buildconsole").unwrap();
    let output = cmd
        .arg("--cwd")
        .arg(project.path())
        .args(["--quiet", "--json", "--", "sh", "-c", script])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["exit_code"], 0);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["file_path"], "a.c");
    assert_eq!(errors[0]["line"], 2);
    assert_eq!(errors[0]["children"][0]["message"], "see here");
    assert!(report["warnings"].as_array().unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn no_parse_only_echoes() {
    let mut cmd = Command::cargo_bin("e-buildconsole").unwrap();
    cmd.args([
        "--no-parse",
        "--no-color",
        "--summary",
        "--",
        "sh",
        "-c",
        "echo 'x.c:1: error: nope'",
    ])
    .assert()
    .success()
    .stdout(contains("x.c:1: error: nope"))
    .stdout(contains("Errors (0)"));
}
