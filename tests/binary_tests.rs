//! Binary smoke tests - the stampa binary run as a subprocess

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::TempDir;

fn write_orders(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Clinic Name").unwrap();
    worksheet.write_string(0, 1, "Qty").unwrap();
    worksheet.write_string(1, 0, "Shinagawa Clinic").unwrap();
    worksheet.write_number(1, 1, 3.0).unwrap();
    workbook.save(path).unwrap();
}

fn write_template(path: &Path) {
    let book = umya_spreadsheet::new_file();
    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}

#[test]
fn test_no_args_shows_usage() {
    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn test_check_preset() {
    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.args(["check", "--preset", "doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_check_unknown_preset_fails() {
    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.args(["check", "--preset", "fax"]).assert().failure();
}

#[test]
fn test_run_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let orders = temp_dir.path().join("orders_250509.xlsx");
    let template = temp_dir.path().join("template.xlsx");
    let config = temp_dir.path().join("job.yaml");
    write_orders(&orders);
    write_template(&template);
    std::fs::write(
        &config,
        "folder_prefix: invoices\nfields:\n  - cell: A7\n    column: \"Clinic Name\"\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.args([
        "run",
        orders.to_str().unwrap(),
        "--template",
        template.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--out-dir",
        temp_dir.path().to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Exported 1 invoices"));

    assert!(temp_dir
        .path()
        .join("invoices_250509/INV_250509_001.xlsx")
        .exists());
}

#[test]
fn test_run_step_mode_quits_on_q() {
    let temp_dir = TempDir::new().unwrap();
    let orders = temp_dir.path().join("orders_250509.xlsx");
    let template = temp_dir.path().join("template.xlsx");
    write_orders(&orders);
    write_template(&template);

    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.args([
        "run",
        orders.to_str().unwrap(),
        "--template",
        template.to_str().unwrap(),
        "--preset",
        "courier",
        "--out-dir",
        temp_dir.path().to_str().unwrap(),
        "--step",
    ])
    .write_stdin("q\n")
    .assert()
    .success()
    .stdout(predicate::str::contains("Stopped"));

    assert!(!temp_dir.path().join("OCS_invoice_250509").exists());
}

#[test]
fn test_missing_date_token_reports_error() {
    let temp_dir = TempDir::new().unwrap();
    let orders = temp_dir.path().join("orders.xlsx");
    let template = temp_dir.path().join("template.xlsx");
    write_orders(&orders);
    write_template(&template);

    let mut cmd = Command::cargo_bin("stampa").unwrap();
    cmd.args([
        "run",
        orders.to_str().unwrap(),
        "--template",
        template.to_str().unwrap(),
        "--preset",
        "doctor",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("DateToken"));
}
