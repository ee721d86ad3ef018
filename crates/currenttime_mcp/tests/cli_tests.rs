use assert_cmd::Command;
use predicates::prelude::*;

/// Test CLI help output
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("mcp-server-currenttime").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--base-url"))
        .stdout(predicate::str::contains("--api-key"));
}

/// Test CLI version output
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("mcp-server-currenttime").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// An unusable provider URL stops startup before the server runs
#[test]
fn test_invalid_base_url() {
    let mut cmd = Command::cargo_bin("mcp-server-currenttime").unwrap();
    cmd.args(["--base-url", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base URL"));
}

/// The base URL can come from the environment
#[test]
fn test_invalid_base_url_from_env() {
    let mut cmd = Command::cargo_bin("mcp-server-currenttime").unwrap();
    cmd.env("IPAPI_BASE_URL", "not a url")
        .assert()
        .failure()
        .stderr(predicate::str::contains("base URL"));
}
