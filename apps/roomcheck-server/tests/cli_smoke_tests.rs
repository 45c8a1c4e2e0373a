//! CLI smoke tests for the roomcheck-server binary: help output, config
//! validation and config printing.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn run_roomcheck_server(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_roomcheck-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute roomcheck-server")
}

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("config.yaml");
    let home = dir.join("home").to_string_lossy().replace('\\', "/");
    let content = format!("server:\n  home_dir: \"{home}\"\n  host: 127.0.0.1\n  port: 8000\n{body}");
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_roomcheck_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roomcheck-server"));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--print-config"));
}

#[test]
fn test_cli_version_command() {
    let output = run_roomcheck_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roomcheck-server 0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_roomcheck_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Unexpected stderr: {stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_roomcheck_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file not found"),
        "Should mention config file issue: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_roomcheck_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid config"),
        "Should mention YAML parsing issue: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        r#"
logging:
  default:
    console_level: info
    file: "logs/roomcheck.log"
    file_level: info
    max_backups: 3
    max_size_mb: 10

modules:
  housekeeping:
    history_limit: 50
    bootstrap:
      email: "kurucu@otel.com"
"#,
    );

    let output = run_roomcheck_server(&["--config", &config_path, "check"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Config check failed: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
    assert!(temp_dir.path().join("home").is_dir(), "home_dir is created");
}

#[test]
fn test_cli_check_rejects_unknown_module_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "modules:\n  housekeeping:\n    histroy_limit: 5\n",
    );

    let output = run_roomcheck_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success(), "Unknown module key should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("housekeeping"), "Unexpected stderr: {stderr}");
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    let output = run_roomcheck_server(&["--config", &config_path, "--port", "9191", "--print-config"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "print-config failed: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"));
    assert!(stdout.contains("static_dir: public"));
}
