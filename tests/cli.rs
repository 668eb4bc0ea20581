//! E2E tests for the summary, gains, validate and schema commands

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Full profile: salary, half-owned rental, receipts, WFH, depreciation and two disposals
#[test]
fn summary_full_profile() {
    let output = run(&["summary", "-r", "tests/data/records.json", "-y", "2025"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("TAX SUMMARY (2024-25)"));
    assert!(stdout.contains("General: $85000.00"));
    assert!(stdout.contains("Property (ownership share): $10000.00"));
    // BTC gain 20000 halved by the discount, less the 100 VAS loss
    assert!(stdout.contains("Net capital gains: $9900.00"));
    // interest share, receipt, WFH hours and laptop; the capital improvement is excluded
    assert!(stdout.contains("DEDUCTIONS (4 items)"));
    assert!(stdout.contains("Property expenses: $4000.00"));
    assert!(stdout.contains("Work from home: $70.00"));
    assert!(stdout.contains("Depreciation: $1000.00"));
    assert!(stdout.contains("TAXABLE INCOME: $99330.00"));
    assert!(stdout.contains("TAX PAYABLE: $20587.00"));
}

#[test]
fn summary_json_output() {
    let output = run(&[
        "summary",
        "-r",
        "tests/data/records.json",
        "-y",
        "2025",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary --json should be valid JSON");
    assert_eq!(json["financial_year"], "2024-25");
    assert_eq!(json["income"]["capital_gains"], "9900.00");
    assert_eq!(json["income"]["disposal_count"], 2);
    assert_eq!(json["deductions"]["count"], 4);
    assert_eq!(json["deductions"]["total"], "5570.00");
    assert_eq!(json["taxable_income"], "99330.00");
    assert_eq!(json["tax_payable"], "20587.00");
    assert_eq!(json["warnings"].as_array().map(Vec::len), Some(0));
}

/// Disposals outside the requested year contribute nothing
#[test]
fn summary_other_year_has_no_gains() {
    let output = run(&[
        "summary",
        "-r",
        "tests/data/records.json",
        "-y",
        "2024",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["income"]["capital_gains"], "0.00");
    assert_eq!(json["income"]["disposal_count"], 0);
}

/// Income, rent, expenses and receipts dated in 2024-25 do not count towards 2023-24
#[test]
fn summary_drops_records_from_other_years() {
    let output = run(&["summary", "-r", "tests/data/records.json", "-y", "2024"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("TAX SUMMARY (2023-24)"));
    assert!(stdout.contains("General: $0.00"));
    assert!(stdout.contains("Property (ownership share): $0.00"));
    assert!(stdout.contains("Receipts: $0.00"));
    // WFH claim and the laptop's 366-day window remain
    assert!(stdout.contains("DEDUCTIONS (2 items)"));
    assert!(stdout.contains("Depreciation: $1002.74"));
    assert!(stdout.contains("TAXABLE INCOME: $0.00"));
}

#[test]
fn summary_reports_unmatched_disposal() {
    let output = run(&["summary", "-r", "tests/data/unmatched.json", "-y", "2025"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    // A shortfall is a warning, not an error
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Net capital gains: $5000.00"));
    assert!(stdout.contains("TAX PAYABLE: $10288.00"));
    assert!(stdout.contains("1 warning(s)"));
    assert!(stdout.contains("disposal 'E2'"));
}

#[test]
fn summary_rejects_invalid_records() {
    let output = run(&["summary", "-r", "tests/data/invalid.json", "-y", "2025"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("ownership_percent"));
}

#[test]
fn summary_missing_file() {
    let output = run(&["summary", "-r", "tests/data/nope.json"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to open"));
}

#[test]
fn gains_from_csv() {
    let output = run(&["gains", "-t", "tests/data/transactions.csv", "-y", "2025"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("VAS"));
    assert!(stdout.contains("BTC"));
    assert!(stdout.contains("1126.00"));
    assert!(stdout.contains("22475.00"));
    assert!(stdout.contains("Net capital gain: $11800.50"));
}

#[test]
fn gains_csv_output_filtered_by_asset() {
    let output = run(&[
        "gains",
        "-t",
        "tests/data/transactions.csv",
        "-a",
        "vas",
        "--csv",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "header plus one disposal: {}", stdout);
    assert!(lines[0].starts_with("date,financial_year,asset"));
    assert!(lines[1].starts_with("2024-10-15,2024-25,VAS,120,11980.00,10854.00,1126.00"));
}

#[test]
fn gains_lots_audit_trail() {
    let output = run(&[
        "gains",
        "-t",
        "tests/data/transactions.csv",
        "--lots",
        "--csv",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("S1,2024-10-15,VAS,A1,2022-03-01,100,9010.00,959"));
    assert!(stdout.contains("S1,2024-10-15,VAS,A2,2023-03-01,20,1844.00,594"));
    assert!(stdout.contains("S2,2025-05-01,BTC,B1,2021-06-30,0.25,7500.00"));
}

#[test]
fn gains_from_record_file() {
    let output = run(&["gains", "-r", "tests/data/records.json", "--csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("BTC"));
    assert!(stdout.contains("-100.00"));
}

#[test]
fn gains_requires_input() {
    let output = run(&["gains"]);
    assert!(!output.status.success());
}

#[test]
fn validate_clean_records() {
    let output = run(&["validate", "-r", "tests/data/records.json", "-y", "2025"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("No issues found"));
}

#[test]
fn validate_unmatched_disposal() {
    let output = run(&[
        "validate",
        "-r",
        "tests/data/unmatched.json",
        "-y",
        "2025",
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["issue_count"], 1);
    assert_eq!(json["issues"][0]["type"], "UnmatchedDisposal");
    assert_eq!(json["issues"][0]["record"], "E2");
}

#[test]
fn validate_collects_every_bad_record() {
    let output = run(&["validate", "-r", "tests/data/invalid.json", "-y", "2025"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("3 issue(s) found"));
    assert!(stdout.contains("[InvalidProperty]"));
    assert!(stdout.contains("[InvalidAsset] D1"));
    assert!(stdout.contains("[InvalidTransaction] X1"));
}

#[test]
fn schema_csv_header() {
    let output = run(&["schema", "csv-header"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        stdout.trim(),
        "id,asset,kind,date,quantity,consideration,fees"
    );
}

#[test]
fn schema_json() {
    let output = run(&["schema"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "TaxRecords");
    assert!(json["properties"]["transactions"].is_object());
}
