//! Summary command - taxable income and tax payable for one financial year

use super::{format_aud, load_config, read_records, records_for_year, resolve_year};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use taxpos::{aggregate, TaxPosition};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// JSON file containing the profile's records ("-" for stdin)
    #[arg(short, long)]
    records: PathBuf,

    /// Financial year to report, by end year (e.g., 2025 for 2024-25)
    #[arg(short, long)]
    year: Option<i32>,

    /// JSON config overriding the bracket table and rates
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Summary data for JSON output
#[derive(Debug, Serialize)]
struct SummaryData {
    financial_year: String,
    income: IncomeSummary,
    deductions: DeductionSummary,
    taxable_income: String,
    tax_payable: String,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct IncomeSummary {
    general: String,
    property: String,
    capital_gains: String,
    disposal_count: usize,
    discount_applied: String,
    total: String,
}

#[derive(Debug, Serialize)]
struct DeductionSummary {
    property_expenses: String,
    receipts: String,
    work_from_home: String,
    depreciation: String,
    count: usize,
    total: String,
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = resolve_year(self.year);
        let records = records_for_year(read_records(&self.records)?, year);
        let config = load_config(self.config.as_deref(), year)?;

        let position = aggregate(&records, &config, year)?;

        if self.json {
            self.print_json(&position)
        } else {
            self.print_summary(&position);
            Ok(())
        }
    }

    fn print_summary(&self, p: &TaxPosition) {
        println!();
        println!("TAX SUMMARY ({})", p.financial_year);
        println!();

        println!("INCOME");
        println!("  General: {}", format_aud(p.income.general));
        println!("  Property (ownership share): {}", format_aud(p.income.property));
        println!(
            "  Net capital gains: {} ({} disposals, discount {})",
            format_aud(p.income.capital_gains),
            p.capital_gains.events.len(),
            format_aud(p.capital_gains.total_discount_applied)
        );
        println!("  Total: {}", format_aud(p.total_income));
        println!();

        println!("DEDUCTIONS ({} items)", p.deduction_count);
        println!("  Property expenses: {}", format_aud(p.deductions.property_expenses));
        println!("  Receipts: {}", format_aud(p.deductions.receipts));
        println!("  Work from home: {}", format_aud(p.deductions.work_from_home));
        println!("  Depreciation: {}", format_aud(p.deductions.depreciation));
        println!("  Total: {}", format_aud(p.total_deductions));
        println!();

        println!("TAXABLE INCOME: {}", format_aud(p.taxable_income));
        println!("TAX PAYABLE: {}", format_aud(p.tax_payable));

        let warnings: Vec<_> = p.capital_gains.warnings().collect();
        if !warnings.is_empty() {
            println!();
            println!("\u{26A0} {} warning(s):", warnings.len());
            for w in warnings {
                println!("  {}", w);
            }
        }
        println!();
    }

    fn print_json(&self, p: &TaxPosition) -> anyhow::Result<()> {
        let data = SummaryData {
            financial_year: p.financial_year.display(),
            income: IncomeSummary {
                general: format!("{:.2}", p.income.general),
                property: format!("{:.2}", p.income.property),
                capital_gains: format!("{:.2}", p.income.capital_gains),
                disposal_count: p.capital_gains.events.len(),
                discount_applied: format!("{:.2}", p.capital_gains.total_discount_applied),
                total: format!("{:.2}", p.total_income),
            },
            deductions: DeductionSummary {
                property_expenses: format!("{:.2}", p.deductions.property_expenses),
                receipts: format!("{:.2}", p.deductions.receipts),
                work_from_home: format!("{:.2}", p.deductions.work_from_home),
                depreciation: format!("{:.2}", p.deductions.depreciation),
                count: p.deduction_count,
                total: format!("{:.2}", p.total_deductions),
            },
            taxable_income: format!("{:.2}", p.taxable_income),
            tax_payable: format!("{:.2}", p.tax_payable),
            warnings: p.capital_gains.warnings().map(|w| w.to_string()).collect(),
        };

        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}
