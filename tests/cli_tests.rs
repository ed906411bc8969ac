use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn billing_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("stay-billing"))
}

fn init(config_path: &Path) {
    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
}

fn run(config_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    billing_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(args)
        .assert()
}

/// Init, add a property and log a three-night stay at 200/night for Smith
fn setup_with_stay() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");
    init(&config_path);

    run(
        &config_path,
        &[
            "add-project",
            "--name",
            "Casa Azul",
            "--client",
            "Owner",
            "--rate",
            "100",
        ],
    )
    .success();

    run(
        &config_path,
        &[
            "log-stay",
            "--project",
            "Casa Azul",
            "--guest",
            "Smith",
            "--check-in",
            "2024-06-01",
            "--check-out",
            "2024-06-04",
            "--rate",
            "200",
            "--date",
            "2024-05-20",
        ],
    )
    .success()
    .stdout(predicate::str::contains("$600.00"));

    (temp_dir, config_path)
}

#[test]
fn test_help() {
    billing_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Track stays, hours and expenses"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");

    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized billing config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("state.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");
    init(&config_path);

    run(&config_path, &["init"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    run(&config_path, &["status"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_shows_draft_number_without_client() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");
    init(&config_path);

    run(&config_path, &["status"])
        .success()
        .stdout(predicate::str::contains("INV-DRAFT"));

    run(&config_path, &["status", "--client", "Smith"])
        .success()
        .stdout(predicate::str::contains("INV-SMI-"))
        .stdout(predicate::str::contains("-01"));
}

#[test]
fn test_projects_and_clients() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(&config_path, &["projects"])
        .success()
        .stdout(predicate::str::contains("Casa Azul"))
        .stdout(predicate::str::contains("ACTIVE"));

    run(&config_path, &["project-status", "casa azul", "archived"])
        .success()
        .stdout(predicate::str::contains("ARCHIVED"));

    run(&config_path, &["clients"])
        .success()
        .stdout(predicate::str::contains("Owner"))
        .stdout(predicate::str::contains("Smith"));
}

#[test]
fn test_log_to_unknown_project_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");
    init(&config_path);

    run(&config_path, &["log-time", "--project", "Nowhere", "--hours", "2"])
        .failure()
        .stderr(predicate::str::contains("Project 'Nowhere' not found"));
}

#[test]
fn test_log_stay_rejects_bad_date() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(
        &config_path,
        &[
            "log-stay",
            "--project",
            "Casa Azul",
            "--guest",
            "Jones",
            "--check-in",
            "06/01/2024",
            "--check-out",
            "2024-06-04",
            "--rate",
            "200",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Expected YYYY-MM-DD"));
}

fn logged_id(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|l| l.trim().strip_prefix("ID: "))
        .unwrap()
        .to_string()
}

#[test]
fn test_log_rejects_negative_and_non_finite_values() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(&config_path, &["log-time", "--project", "Casa Azul", "--hours=-5"])
        .failure()
        .stderr(predicate::str::contains("must be zero or more"));

    run(&config_path, &["log-time", "--project", "Casa Azul", "--hours", "NaN"])
        .failure()
        .stderr(predicate::str::contains("must be zero or more"));

    run(
        &config_path,
        &["log-expense", "--project", "Casa Azul", "--cost", "100", "--markup=-250"],
    )
    .failure()
    .stderr(predicate::str::contains("at least -100"));

    run(&config_path, &["logs"])
        .success()
        .stdout(predicate::str::contains("TIME").not())
        .stdout(predicate::str::contains("EXPENSE").not());
}

#[test]
fn test_edit_log_validates_and_rederives() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");
    init(&config_path);
    run(
        &config_path,
        &["add-project", "--name", "Casa Azul", "--client", "Owner", "--rate", "100"],
    )
    .success();

    let output = run(
        &config_path,
        &[
            "log-stay",
            "--project",
            "Casa Azul",
            "--guest",
            "Smith",
            "--check-in",
            "2024-06-01",
            "--check-out",
            "2024-06-04",
            "--rate",
            "200",
        ],
    )
    .success()
    .get_output()
    .clone();
    let id = logged_id(&output);

    run(&config_path, &["edit-log", &id, "--check-out", "2024-05-01"])
        .failure()
        .stderr(predicate::str::contains("must be after check-in"));

    run(&config_path, &["edit-log", &id, "--rate=-200"])
        .failure()
        .stderr(predicate::str::contains("must be zero or more"));

    run(&config_path, &["edit-log", &id, "--hours", "3"])
        .failure()
        .stderr(predicate::str::contains("does not apply"));

    run(&config_path, &["edit-log", &id, "--check-out", "2024-06-06"]).success();

    run(&config_path, &["logs"])
        .success()
        .stdout(predicate::str::contains("$1,000.00"));
}

#[test]
fn test_corrupt_state_is_reported_as_state_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");
    init(&config_path);
    fs::write(config_path.join("state.toml"), "[[logs]\nid = ").unwrap();

    run(&config_path, &["logs"])
        .failure()
        .stderr(predicate::str::contains("Failed to parse state file"))
        .stderr(predicate::str::contains("config file").not());
}

#[test]
fn test_preview_does_not_save() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(&config_path, &["preview", "--client", "Smith"])
        .success()
        .stdout(predicate::str::contains("Guest Stay"))
        .stdout(predicate::str::contains("06/01/2024 to 06/04/2024"))
        .stdout(predicate::str::contains("$600.00"))
        .stdout(predicate::str::contains("preview only"));

    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("No invoices generated yet."));
}

#[test]
fn test_generate_missing_client() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(&config_path, &["generate"])
        .failure()
        .stderr(predicate::str::contains("No client selected"));
}

#[test]
fn test_generate_no_logs() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(&config_path, &["generate", "--client", "Jones"])
        .failure()
        .stderr(predicate::str::contains("No billable logs found"));

    run(
        &config_path,
        &["generate", "--client", "Smith", "--month", "2023-01"],
    )
    .failure()
    .stderr(predicate::str::contains("No billable logs found"));
}

#[test]
fn test_generate_and_pay_in_full() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(&config_path, &["generate", "--client", "Smith"])
        .success()
        .stdout(predicate::str::contains("Generated INV-SMI-"))
        .stdout(predicate::str::contains("-01"))
        .stdout(predicate::str::contains("$600.00"))
        .stdout(predicate::str::contains("Status: SENT"));

    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("INV-SMI-"))
        .stdout(predicate::str::contains("SENT"))
        .stdout(predicate::str::contains("(=) OUTSTANDING"));

    run(&config_path, &["add-payment", "1", "200"])
        .success()
        .stdout(predicate::str::contains("$400.00 remaining"))
        .stdout(predicate::str::contains("PARTIAL"));

    run(&config_path, &["add-payment", "1", "400", "--method", "Wire"])
        .success()
        .stdout(predicate::str::contains("fully paid"))
        .stdout(predicate::str::contains("PAID"));

    run(&config_path, &["payments", "1"])
        .success()
        .stdout(predicate::str::contains("Credit Card"))
        .stdout(predicate::str::contains("Wire"))
        .stdout(predicate::str::contains(
            "Total paid: $600.00 / $600.00 (Status: PAID)",
        ));

    run(&config_path, &["remove-payment", "1"])
        .success()
        .stdout(predicate::str::contains("status: PARTIAL"));
}

#[test]
fn test_second_invoice_same_month_increments_sequence() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(&config_path, &["generate", "--client", "Smith"]).success();
    run(&config_path, &["generate", "--client", "Smith"])
        .success()
        .stdout(predicate::str::contains("-02"));
}

#[test]
fn test_generate_with_deposit_schedule_and_prepayment() {
    let (_temp_dir, config_path) = setup_with_stay();

    run(
        &config_path,
        &[
            "generate",
            "--client",
            "Smith",
            "--structure",
            "deposit-50",
            "--paid",
            "100",
            "--deposit-date",
            "2024-05-20",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Deposit (50% due upon booking): $250.00"))
    .stdout(predicate::str::contains(
        "Balance (Due on or before check-in): $250.00 by 06/01/2024",
    ))
    .stdout(predicate::str::contains("Status: PARTIAL"));

    run(&config_path, &["payments", "1"])
        .success()
        .stdout(predicate::str::contains("Pre-payment"))
        .stdout(predicate::str::contains("Initial Payment / Deposit"));
}

#[test]
fn test_add_payment_rejects_non_positive_amount() {
    let (_temp_dir, config_path) = setup_with_stay();
    run(&config_path, &["generate", "--client", "Smith"]).success();

    run(&config_path, &["add-payment", "1", "0"])
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_invalid_invoice_index() {
    let (_temp_dir, config_path) = setup_with_stay();
    run(&config_path, &["generate", "--client", "Smith"]).success();

    run(&config_path, &["payments", "5"])
        .failure()
        .stderr(predicate::str::contains("Invalid invoice index"));

    run(&config_path, &["payments", "INV-NOPE-0000-01"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_remove_payment_without_payments() {
    let (_temp_dir, config_path) = setup_with_stay();
    run(&config_path, &["generate", "--client", "Smith"]).success();

    run(&config_path, &["remove-payment", "1"])
        .failure()
        .stderr(predicate::str::contains("No payments recorded"));
}

#[test]
fn test_draft_email_without_email_config() {
    let (_temp_dir, config_path) = setup_with_stay();
    run(&config_path, &["generate", "--client", "Smith"]).success();

    run(&config_path, &["draft-email", "1"])
        .success()
        .stdout(predicate::str::contains("not configured"));
}

fn write_state(config_path: &Path, state: &str) {
    fs::write(config_path.join("state.toml"), state).unwrap();
}

#[test]
fn test_pay_invoice_by_number_from_stored_state() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing");
    init(&config_path);

    write_state(
        &config_path,
        r#"[[invoices]]
id = "inv-1"
invoice_number = "INV-SMI-2405-01"
client_id = "Smith"
date = "2024-05-10"
due_date = "2024-05-10"
terms = "DUE_ON_RECEIPT"
subtotal = 770.0
tax = 0.0
total = 770.0
status = "SENT"
created_at = "2024-05-10T12:00:00Z"

[[invoices.items]]
description = "Guest Stay"
quantity = 3.0
rate = 200.0
amount = 600.0
type = "STAY"
original_log_id = "log-1"
dates = "06/01/2024 to 06/04/2024"
"#,
    );

    run(&config_path, &["add-payment", "INV-SMI-2405-01", "770"])
        .success()
        .stdout(predicate::str::contains("fully paid"));

    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("INV-SMI-2405-01"))
        .stdout(predicate::str::contains("PAID"));

    run(&config_path, &["status"])
        .success()
        .stdout(predicate::str::contains("Invoices:         1"))
        .stdout(predicate::str::contains("Outstanding:      $0.00"));
}
