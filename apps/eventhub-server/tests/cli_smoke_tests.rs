//! CLI smoke tests for the eventhub-server binary: help output, config
//! validation and a short mock-database startup.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_eventhub_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_eventhub-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute eventhub-server")
}

async fn run_eventhub_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_eventhub-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Config rooted in `dir` so logs and the database stay inside the temp dir.
fn write_config(dir: &Path, body: &str) -> String {
    let home = dir.join("home").to_string_lossy().replace('\\', "/");
    let content = format!("server:\n  home_dir: \"{home}\"\n  host: 127.0.0.1\n  port: 0\n{body}");
    let path = dir.join("config.yaml");
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_eventhub_server(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("eventhub-server") || stdout.contains("EventHub"));
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_eventhub_server(&["--version"]);
    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("eventhub-server"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_eventhub_server(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report the bad subcommand: {stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    for flag in ["--config", "-c"] {
        let output = run_eventhub_server(&[flag, "/nonexistent/config.yaml", "check"]);
        assert!(!output.status.success(), "Should fail with missing config");

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("config file not found"),
            "Should mention the missing file: {stderr}"
        );
    }
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed").expect("Failed to write file");

    let output = run_eventhub_server(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load configuration"),
        "Should mention the load failure: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_malformed_logging_section() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "logging:\n  level: \"info\"\n",
    );

    let output = run_eventhub_server(&["--config", &config_path, "check"]);
    assert!(
        !output.status.success(),
        "A logging section must map subsystem names to sections"
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        r#"
database:
  url: "sqlite://database/eventhub.db"

logging:
  default:
    console_level: info
    file: "logs/eventhub.log"
    file_level: info
    max_backups: 3
    max_size_mb: 100

modules:
  bookings:
    currency: INR
    razorpay:
      key_id: rzp_test_key
      key_secret: s3cret
"#,
    );

    let output = run_eventhub_server(&["--config", &config_path, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Should succeed with valid config: {stderr}");
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("rzp_test_key"), "Effective YAML is printed: {stdout}");
}

#[test]
fn test_cli_check_accepts_postgres_with_mock() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "database:\n  url: \"postgresql://localhost/nonexistent\"\n",
    );

    let output = run_eventhub_server(&["--config", &config_path, "--mock", "check"]);
    assert!(
        output.status.success(),
        "check never connects: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_check_rejects_unknown_database_scheme() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "database:\n  url: \"mysql://localhost/eventhub\"\n",
    );

    let output = run_eventhub_server(&["--config", &config_path, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported database DSN"), "{stderr}");
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let output = run_eventhub_server(&["--config", &config_path, "--port", "9321", "--print-config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9321"), "{stdout}");
    assert!(stdout.contains("127.0.0.1:9321"), "Ingress address follows --port: {stdout}");
}

#[tokio::test]
async fn test_cli_run_command_with_mock_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "database:\n  url: \"sqlite://database/eventhub.db\"\n",
    );

    let result = run_eventhub_server_with_timeout(
        &["--config", &config_path, "--mock", "run"],
        Duration::from_secs(5),
    )
    .await;

    match result {
        // Still serving when the timeout hit.
        Err(err) => assert!(
            err.to_string().contains("elapsed"),
            "Server failed to start: {err}"
        ),
        Ok(output) => panic!(
            "Server exited early:\nSTDOUT: {}\nSTDERR: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ),
    }
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_eventhub_server(&["run", "--help"]);
    assert!(output.status.success(), "Run subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Start the server"));

    let output = run_eventhub_server(&["check", "--help"]);
    assert!(output.status.success(), "Check subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Check configuration"));
}

#[test]
fn test_cli_verbose_flag() {
    let output = run_eventhub_server(&["--verbose", "--help"]);
    assert!(output.status.success(), "Verbose help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage:"));
}
