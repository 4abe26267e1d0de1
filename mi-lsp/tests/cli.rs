use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn prints_version() {
    let mut cmd = cargo_bin_cmd!("mi-lsp");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("mi-lsp");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(dir.path().join("absent.toml"));

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn invalid_project_config_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut file = std::fs::File::create(dir.path().join("mi-lsp.toml")).expect("config file");
    writeln!(file, "[logging]\nformat = \"xml\"").expect("write config");

    let mut cmd = cargo_bin_cmd!("mi-lsp");
    cmd.current_dir(dir.path());

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn help_marks_stdio_flag_as_ignored() {
    let mut cmd = cargo_bin_cmd!("mi-lsp");
    cmd.arg("--help");

    cmd.assert().success().stdout(
        predicate::str::contains("--stdio")
            .and(predicate::str::contains("Accepted for client compatibility and ignored")),
    );
}
