//! Integration tests for the CLI interface
//!
//! Tests the entry point, command parsing, and the JSON printed for each
//! subcommand against the bundled sample document.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE_850: &str = include_str!("../demos/sample_850.edi");

fn sample_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_850.as_bytes()).unwrap();
    file
}

fn edi_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("process"));
}

#[test]
fn test_no_command_shows_usage() {
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("not-a-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_parse_prints_document_json() {
    let file = sample_file();
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("parse")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"purchase_order_number\": \"PO-2024-001\""))
        .stdout(predicate::str::contains("\"sender_id\": \"SENDERID\""));
}

#[test]
fn test_parse_missing_file_fails() {
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("parse")
        .arg("/nonexistent/missing.edi")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read EDI file"));
}

#[test]
fn test_parse_invalid_document_names_segment() {
    let file = edi_file("GS*PO*S*R*20240101*1200*1*X*004010~CTT*0~");
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("parse")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ISA segment not found or incomplete"));
}

#[test]
fn test_transform_prints_erp_payload() {
    let file = sample_file();
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("transform")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"po_number\": \"PO-2024-001\""))
        .stdout(predicate::str::contains("\"po_type\": \"New Order\""))
        .stdout(predicate::str::contains("\"total_amount\": 247.4"));
}

#[test]
fn test_validate_accepts_clean_order() {
    let file = sample_file();
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("validate")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Purchase order PO-2024-001 passed all business rules",
        ));
}

#[test]
fn test_validate_reports_violations_and_fails() {
    let edi = SAMPLE_850.replace("PO1*1*10*EA*9.99", "PO1*1*0*EA*9.99");
    let file = edi_file(&edi);
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("validate")
        .arg(file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed validation"))
        .stdout(predicate::str::contains(
            "Line 1: Quantity must be greater than zero",
        ));
}

#[test]
fn test_process_against_simulated_erp() {
    let file = sample_file();
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("process")
        .arg(file.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("\"attempts\": 1"))
        .stdout(predicate::str::contains("ERP-PO-2024-001-"));
}

#[test]
fn test_process_scenario_exits_nonzero() {
    let file = sample_file();
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("process")
        .arg(file.path())
        .arg("--scenario")
        .arg("duplicate")
        .arg("--max-attempts")
        .arg("2")
        .arg("--initial-delay")
        .arg("0.001")
        .arg("--quiet")
        .assert()
        .failure()
        .stdout(predicate::str::contains("All 2 submission attempts failed"))
        .stdout(predicate::str::contains("DUPLICATE_PO"));
}

#[test]
fn test_process_rejects_scenario_with_endpoint() {
    let file = sample_file();
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("process")
        .arg(file.path())
        .arg("--endpoint")
        .arg("http://localhost:9999")
        .arg("--scenario")
        .arg("timeout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_process_rejects_zero_max_attempts() {
    let file = sample_file();
    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("process")
        .arg(file.path())
        .arg("--max-attempts")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-attempts must be at least 1"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[retry]\nmax_attempts = 1").unwrap();
    let edi = sample_file();

    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("--config")
        .arg(config.path())
        .arg("process")
        .arg(edi.path())
        .arg("--scenario")
        .arg("timeout")
        .arg("--quiet")
        .assert()
        .failure()
        .stdout(predicate::str::contains("All 1 submission attempts failed"));
}

#[test]
fn test_invalid_config_file_fails() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "retry = \"not a table\"").unwrap();
    let edi = sample_file();

    let mut cmd = Command::cargo_bin("ediflow").unwrap();
    cmd.arg("--config")
        .arg(config.path())
        .arg("parse")
        .arg(edi.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pipeline config"));
}
