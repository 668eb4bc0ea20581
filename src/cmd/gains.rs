//! Gains command - disposal events with FIFO cost base and discount

use super::{format_aud, format_quantity, read_records, read_transactions};
use crate::utils::write_csv;
use clap::Args;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use taxpos::core::{parse_transactions, TransactionRecord};
use taxpos::tax::{compute_capital_gains, CapitalGainsSummary, DisposalEvent};
use taxpos::FinancialYear;

#[derive(Args, Debug)]
pub struct GainsCommand {
    /// JSON record file; its transactions are used
    #[arg(
        short,
        long,
        required_unless_present = "transactions",
        conflicts_with = "transactions"
    )]
    records: Option<PathBuf>,

    /// CSV file of transactions (see `schema csv-fields`)
    #[arg(short, long)]
    transactions: Option<PathBuf>,

    /// Only disposals in this financial year (e.g., 2025 for 2024-25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Filter by asset (e.g., BTC, VAS)
    #[arg(short, long)]
    asset: Option<String>,

    /// Output as CSV instead of a formatted table
    #[arg(long)]
    csv: bool,

    /// One row per matched lot instead of per disposal
    #[arg(long)]
    lots: bool,
}

impl GainsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = self.read_input()?;
        let transactions = parse_transactions(&records)?;
        let filtered: Vec<_> = match &self.asset {
            Some(asset) => transactions
                .into_iter()
                .filter(|t| t.asset.eq_ignore_ascii_case(asset))
                .collect(),
            None => transactions,
        };

        let mut summary = compute_capital_gains(&filtered);
        if let Some(year) = self.year {
            summary = summary.for_year(FinancialYear(year));
        }

        match (self.csv, self.lots) {
            (true, true) => write_csv(lot_rows(&summary.events), io::stdout()),
            (true, false) => write_csv(disposal_rows(&summary.events), io::stdout()),
            (false, true) => {
                print_table(lot_rows(&summary.events));
                Ok(())
            }
            (false, false) => {
                print_table(disposal_rows(&summary.events));
                print_totals(&summary);
                Ok(())
            }
        }
    }

    fn read_input(&self) -> anyhow::Result<Vec<TransactionRecord>> {
        match (&self.records, &self.transactions) {
            (Some(path), _) => Ok(read_records(path)?.transactions),
            (None, Some(path)) => read_transactions(path),
            (None, None) => anyhow::bail!("Provide --records or --transactions"),
        }
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("No disposals found matching filters");
        return;
    }
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

fn print_totals(summary: &CapitalGainsSummary) {
    println!();
    println!(
        "Disposals: {} | Gains: {} | Losses: {} | Discount: {} | Net capital gain: {}",
        summary.events.len(),
        format_aud(summary.total_gains),
        format_aud(summary.total_losses),
        format_aud(summary.total_discount_applied),
        format_aud(summary.taxable_capital_gain)
    );
    for (asset, totals) in summary.by_asset() {
        println!(
            "  {}: {} disposal(s), proceeds {}, cost base {}, taxable {}",
            asset,
            totals.disposals,
            format_aud(totals.proceeds),
            format_aud(totals.cost_base),
            format_aud(totals.taxable_gain)
        );
    }
    for w in summary.warnings() {
        println!("\u{26A0} {}", w);
    }
}

/// Row for the disposal table
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct DisposalRow {
    #[tabled(rename = "Date")]
    pub date: String,

    #[tabled(rename = "FY")]
    pub financial_year: String,

    #[tabled(rename = "Asset")]
    pub asset: String,

    #[tabled(rename = "Quantity")]
    pub quantity: String,

    #[tabled(rename = "Proceeds")]
    pub proceeds: String,

    #[tabled(rename = "Cost Base")]
    pub cost_base: String,

    #[tabled(rename = "Gain/Loss")]
    pub gross_gain: String,

    #[tabled(rename = "Days Held")]
    pub holding_days: String,

    #[tabled(rename = "Discount")]
    pub discount: String,

    #[tabled(rename = "Taxable")]
    pub taxable_gain: String,

    #[tabled(rename = "Unmatched")]
    pub unmatched: String,
}

/// Row for the matched-lot audit trail
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct LotRow {
    #[tabled(rename = "Disposal")]
    pub disposal_id: String,

    #[tabled(rename = "Sold")]
    pub disposed: String,

    #[tabled(rename = "Asset")]
    pub asset: String,

    #[tabled(rename = "Lot")]
    pub lot_id: String,

    #[tabled(rename = "Acquired")]
    pub acquired: String,

    #[tabled(rename = "Quantity")]
    pub quantity: String,

    #[tabled(rename = "Cost")]
    pub cost: String,

    #[tabled(rename = "Days Held")]
    pub holding_days: i64,
}

fn disposal_rows(events: &[DisposalEvent]) -> Vec<DisposalRow> {
    events
        .iter()
        .map(|e| DisposalRow {
            date: e.date().format("%Y-%m-%d").to_string(),
            financial_year: e.financial_year().display(),
            asset: e.asset.clone(),
            quantity: format_quantity(e.quantity),
            proceeds: format!("{:.2}", e.proceeds),
            cost_base: format!("{:.2}", e.cost_base),
            gross_gain: format!("{:.2}", e.gross_gain),
            holding_days: format!("{:.0}", e.holding_days.floor()),
            discount: format!("{:.2}", e.discount),
            taxable_gain: format!("{:.2}", e.taxable_gain),
            unmatched: format_quantity(e.unmatched_quantity),
        })
        .collect()
}

fn lot_rows(events: &[DisposalEvent]) -> Vec<LotRow> {
    events
        .iter()
        .flat_map(|e| {
            e.matched_lots.iter().map(move |lot| LotRow {
                disposal_id: e.transaction_id.clone(),
                disposed: e.date().format("%Y-%m-%d").to_string(),
                asset: e.asset.clone(),
                lot_id: lot.source_id.clone(),
                acquired: lot.acquired.format("%Y-%m-%d").to_string(),
                quantity: format_quantity(lot.quantity),
                cost: format!("{:.2}", lot.cost),
                holding_days: lot.holding_days,
            })
        })
        .collect()
}
