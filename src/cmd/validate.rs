//! Validate command - surface data quality issues without computing a full position

use super::{load_config, read_records, records_for_year, resolve_year};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use taxpos::core::{Transaction, TransactionRecord};
use taxpos::tax::position::OwnershipMap;
use taxpos::tax::{compute_capital_gains, depreciation_schedule, validate_brackets};
use taxpos::{aggregate, FinancialYear};

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// JSON file containing the profile's records ("-" for stdin)
    #[arg(short, long)]
    records: PathBuf,

    /// Financial year to check (e.g., 2025 for 2024-25)
    #[arg(short, long)]
    year: Option<i32>,

    /// JSON config to check alongside the records
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(rename = "type")]
    issue_type: String,
    record: String,
    message: String,
}

impl ValidationIssue {
    fn new(issue_type: &str, record: impl Into<String>, message: impl ToString) -> Self {
        ValidationIssue {
            issue_type: issue_type.to_string(),
            record: record.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationOutput {
    financial_year: String,
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = resolve_year(self.year);
        let records = read_records(&self.records)?;
        let config = load_config(self.config.as_deref(), year)?;

        let mut issues = Vec::new();

        for issue in validate_brackets(&config.brackets) {
            issues.push(ValidationIssue::new("BracketTable", "config", issue));
        }

        if let Err(e) = OwnershipMap::from_properties(&records.properties) {
            issues.push(ValidationIssue::new("InvalidProperty", "properties", e));
        }

        for (id, result) in depreciation_schedule(&records.depreciable_assets, year.end_date()) {
            if let Err(e) = result {
                issues.push(ValidationIssue::new("InvalidAsset", id, e));
            }
        }

        issues.extend(self.transaction_issues(&records.transactions, year));

        // Anything the targeted checks missed surfaces as the first aggregation error
        if issues.is_empty() {
            if let Err(e) = aggregate(&records_for_year(records, year), &config, year) {
                issues.push(ValidationIssue::new("InvalidRecord", "records", e));
            }
        }

        if self.json {
            self.print_json(&issues, year)?;
        } else {
            self.print_text(&issues, year);
        }

        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }

    /// Parse failures for every bad row, then FIFO warnings over the rows that parsed
    fn transaction_issues(
        &self,
        records: &[TransactionRecord],
        year: FinancialYear,
    ) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut transactions = Vec::with_capacity(records.len());
        for record in records {
            match Transaction::try_from(record) {
                Ok(tx) => transactions.push(tx),
                Err(e) => issues.push(ValidationIssue::new(
                    "InvalidTransaction",
                    record.id.clone(),
                    e,
                )),
            }
        }

        let summary = compute_capital_gains(&transactions);
        let summary = if self.year.is_some() {
            summary.for_year(year)
        } else {
            summary
        };
        for warning in summary.warnings() {
            let id = match warning {
                taxpos::Warning::UnmatchedDisposal { transaction_id, .. } => transaction_id,
            };
            issues.push(ValidationIssue::new(warning.kind(), id.clone(), warning));
        }
        issues
    }

    fn print_text(&self, issues: &[ValidationIssue], year: FinancialYear) {
        println!();
        println!("VALIDATION RESULTS ({})", year);
        println!();

        if issues.is_empty() {
            println!("\u{2713} No issues found.");
            return;
        }

        println!("\u{26A0} {} issue(s) found:", issues.len());
        println!();
        for (i, issue) in issues.iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, issue.issue_type, issue.record);
            println!("     {}", issue.message);
            println!();
        }
    }

    fn print_json(&self, issues: &[ValidationIssue], year: FinancialYear) -> anyhow::Result<()> {
        let output = ValidationOutput {
            financial_year: year.display(),
            issue_count: issues.len(),
            issues: issues.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
