//! CLI smoke tests for the modeladmin-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, and server startup.

use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Helper to run the modeladmin-server binary with given arguments
fn run_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_modeladmin-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute modeladmin-server")
}

/// Helper to run the binary with a timeout; `Err` means it was still running.
async fn run_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_modeladmin-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Writes `content` to `name` inside a fresh temp dir, with `home_dir` pinned
/// inside that dir so tests never touch the real home directory.
fn write_config(name: &str, content: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let home = temp_dir.path().join("home");
    let config_path = temp_dir.path().join(name);
    let full = format!(
        "server:\n  home_dir: \"{}\"\n  host: \"127.0.0.1\"\n  port: 0\n{content}",
        home.display()
    );
    std::fs::write(&config_path, full).expect("Failed to write config file");
    let path = config_path.to_string_lossy().to_string();
    (temp_dir, path)
}

const LOGGING: &str = r#"
logging:
  default:
    console_level: info
    file: "logs/modeladmin.log"
    file_level: info
    max_backups: 3
    max_size_mb: 10
"#;

#[test]
fn test_cli_help_command() {
    let output = run_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("modeladmin-server") || stdout.contains("ModelAdmin"),
        "Should contain binary name"
    );
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("modeladmin-server"), "Should contain binary name");
    assert!(
        stdout.chars().any(|c| c.is_ascii_digit()),
        "Should contain version numbers"
    );
}

#[test]
fn test_cli_invalid_command() {
    let output = run_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file not found"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_flag_short_form() {
    let output = run_server(&["-c", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config file");
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("yaml") || stderr.contains("figment"),
        "Should mention YAML parsing issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let modules = r#"
modules:
  model_admin:
    list_per_page: 25
    inspect_view_enabled: true
"#;
    let (_dir, path) = write_config("valid.yaml", &format!("{LOGGING}{modules}"));

    let output = run_server(&["--config", &path, "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("list_per_page: 25"));
}

#[test]
fn test_cli_check_rejects_unknown_module_option() {
    let modules = r#"
modules:
  model_admin:
    list_per_pages: 25
"#;
    let (_dir, path) = write_config("typo.yaml", modules);

    let output = run_server(&["--config", &path, "check"]);

    assert!(!output.status.success(), "Unknown option should fail the check");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("model_admin"),
        "Should name the module: {}",
        stderr
    );
}

#[test]
fn test_cli_rejects_unknown_top_level_section() {
    let (_dir, path) = write_config("database.yaml", "database:\n  url: \"sqlite::memory:\"\n");

    let output = run_server(&["--config", &path, "check"]);

    assert!(!output.status.success(), "Unknown section should be rejected");
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let (_dir, path) = write_config("print.yaml", LOGGING);

    let output = run_server(&["--config", &path, "--port", "9123", "--print-config"]);

    assert!(output.status.success(), "print-config should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9123"), "Override missing: {}", stdout);
}

#[tokio::test]
async fn test_cli_run_command_starts_server() {
    let (_dir, path) = write_config("run.yaml", LOGGING);

    let result =
        run_server_with_timeout(&["--config", &path, "run"], Duration::from_secs(5)).await;

    match result {
        Err(err) => assert!(
            err.to_string().contains("elapsed"),
            "Server failed to start: {}",
            err
        ),
        Ok(output) => {
            eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
            eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
            panic!("Server exited instead of serving");
        }
    }
}

#[test]
fn test_cli_verbose_flag() {
    let output = run_server(&["--verbose", "--help"]);

    assert!(output.status.success(), "Verbose help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "Should still contain usage information");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_server(&["run", "--help"]);
    assert!(output.status.success(), "Run subcommand help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Start the server"));

    let output = run_server(&["check", "--help"]);
    assert!(output.status.success(), "Check subcommand help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Check configuration"));
}
