use assert_cmd::cargo;
use predicates::prelude::*;

#[tokio::test]
async fn test_cli_help() {
    let mut cmd = cargo::cargo_bin_cmd!("auditor");
    let assert = cmd.arg("--help").assert();

    assert
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains("--start <URL>"))
        .stdout(predicate::str::contains("--max-pages"))
        .stdout(predicate::str::contains("--same-domain"));
}

#[tokio::test]
async fn test_cli_requires_start() {
    let mut cmd = cargo::cargo_bin_cmd!("auditor");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--start <URL>"));
}

#[tokio::test]
async fn test_cli_rejects_start_without_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo::cargo_bin_cmd!("auditor");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["--start", "example.com"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("must include scheme"));
}
