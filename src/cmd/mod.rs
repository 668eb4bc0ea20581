pub mod gains;
pub mod schema;
pub mod summary;
pub mod validate;

use anyhow::Context;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use taxpos::core::parse::parse_date;
use taxpos::core::{read_records_json, read_transactions_csv, TaxRecords, TransactionRecord};
use taxpos::{FinancialYear, TaxConfig};

/// Read the JSON record file (or stdin with "-")
pub fn read_records(path: &Path) -> anyhow::Result<TaxRecords> {
    if path.as_os_str() == "-" {
        let buffer = read_stdin()?;
        return read_records_json(buffer.as_slice()).context("Failed to parse records from stdin");
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_records_json(BufReader::new(file))
        .with_context(|| format!("Failed to parse records in {}", path.display()))
}

/// Read a transaction CSV (or stdin with "-")
pub fn read_transactions(path: &Path) -> anyhow::Result<Vec<TransactionRecord>> {
    if path.as_os_str() == "-" {
        let buffer = read_stdin()?;
        return read_transactions_csv(buffer.as_slice())
            .context("Failed to parse transactions from stdin");
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_transactions_csv(BufReader::new(file))
        .with_context(|| format!("Failed to parse transactions in {}", path.display()))
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin().lock().read_to_end(&mut buffer)?;
    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(buffer)
}

/// Keep only the dated income, expense and receipt records that fall in `year`.
///
/// Records with an unreadable date are kept so the aggregator reports them.
/// Transactions and depreciable assets span years and are left alone.
pub fn records_for_year(mut records: TaxRecords, year: FinancialYear) -> TaxRecords {
    let in_year = |date: &str| parse_date("", "date", date).map_or(true, |d| year.contains(d));
    let before = records.income.len()
        + records.property_income.len()
        + records.property_expenses.len()
        + records.receipts.len();

    records.income.retain(|r| in_year(&r.date));
    records.property_income.retain(|r| in_year(&r.date));
    records.property_expenses.retain(|r| in_year(&r.date));
    records.receipts.retain(|r| in_year(&r.date));

    let after = records.income.len()
        + records.property_income.len()
        + records.property_expenses.len()
        + records.receipts.len();
    if after < before {
        log::debug!("Skipped {} record(s) dated outside {}", before - after, year);
    }
    records
}

/// Config file if given, otherwise the built-in rates for `year`
pub fn load_config(path: Option<&Path>, year: FinancialYear) -> anyhow::Result<TaxConfig> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            TaxConfig::from_reader(BufReader::new(file), year)
                .with_context(|| format!("Invalid config {}", path.display()))
        }
        None => Ok(TaxConfig::for_year(year)),
    }
}

/// Requested year, or the one containing today
pub fn resolve_year(year: Option<i32>) -> FinancialYear {
    year.map(FinancialYear)
        .unwrap_or_else(|| FinancialYear::from_date(chrono::Local::now().date_naive()))
}

pub fn format_aud(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

pub fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.8}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
