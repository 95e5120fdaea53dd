//! Smoke tests for the curopt binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_the_tool() {
    Command::cargo_bin("curopt")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Curation signal allocation optimizer"))
        .stdout(predicate::str::contains("--budget"))
        .stdout(predicate::str::contains("--wallet"));
}

#[test]
fn requires_budget_or_wallet() {
    Command::cargo_bin("curopt").unwrap().assert().failure();
}

#[test]
fn missing_config_file_is_a_clean_failure() {
    Command::cargo_bin("curopt")
        .unwrap()
        .args(["--config", "/nonexistent/curopt.toml", "--budget", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn invalid_config_step_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
            [network]
            graph_api_url = "https://example.com/graph"
            price_api_url = "https://example.com/price"
            usage_api_url = "https://example.com/usage"

            [logging]
            level = "info"
            format = "pretty"

            [optimizer]
            step_size = -5.0
        "#,
    )
    .unwrap();

    Command::cargo_bin("curopt")
        .unwrap()
        .args(["--config", path.to_str().unwrap(), "--budget", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("optimizer.step_size"));
}
