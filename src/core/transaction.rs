use super::error::TaxError;
use super::parse::{parse_amount, parse_datetime, parse_non_negative};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;
use taxpos_derive::CsvSchema;

/// Column description generated by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Asset buy/sell record as stored by the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, CsvSchema)]
pub struct TransactionRecord {
    /// Unique identifier for this transaction
    pub id: String,
    /// Asset identifier (e.g., BTC, VAS)
    pub asset: String,
    /// acquisition (buy), disposal (sell) or opening_balance
    pub kind: String,
    /// Trade date (YYYY-MM-DD or RFC 3339)
    pub date: String,
    /// Number of units (fractional allowed)
    pub quantity: String,
    /// Total consideration paid or received, not per unit
    pub consideration: String,
    /// Brokerage and other fees
    #[serde(default)]
    pub fees: Option<String>,
}

impl TransactionRecord {
    /// Label used in error messages
    pub fn label(&self) -> String {
        format!("transaction '{}' ({}, {})", self.id, self.asset, self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Acquisition,
    Disposal,
    OpeningBalance,
}

impl FromStr for TransactionKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "acquisition" | "buy" => Ok(TransactionKind::Acquisition),
            "disposal" | "sell" => Ok(TransactionKind::Disposal),
            "opening_balance" | "opening" => Ok(TransactionKind::OpeningBalance),
            _ => Err("expected acquisition, disposal or opening_balance"),
        }
    }
}

impl TransactionKind {
    /// Opening balances are matched exactly like acquisitions
    pub fn is_acquisition_like(self) -> bool {
        matches!(
            self,
            TransactionKind::Acquisition | TransactionKind::OpeningBalance
        )
    }
}

/// Parsed, validated transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub asset: String,
    pub kind: TransactionKind,
    pub datetime: DateTime<FixedOffset>,
    /// Total consideration for the whole quantity
    pub consideration: Decimal,
    pub quantity: Decimal,
    pub fees: Decimal,
}

impl Transaction {
    pub fn date(&self) -> NaiveDate {
        self.datetime.date_naive()
    }
}

impl TryFrom<&TransactionRecord> for Transaction {
    type Error = TaxError;

    fn try_from(record: &TransactionRecord) -> Result<Self, Self::Error> {
        let label = record.label();
        let kind: TransactionKind = record
            .kind
            .parse()
            .map_err(|reason| TaxError::parse(&label, "kind", &record.kind, reason))?;
        let datetime = parse_datetime(&label, "date", &record.date)?;
        let quantity = parse_amount(&label, "quantity", &record.quantity)?;
        if quantity <= Decimal::ZERO {
            return Err(TaxError::parse(
                &label,
                "quantity",
                &record.quantity,
                "must be greater than zero",
            ));
        }
        let consideration = parse_amount(&label, "consideration", &record.consideration)?;
        if consideration < Decimal::ZERO {
            return Err(TaxError::parse(
                &label,
                "consideration",
                &record.consideration,
                "must not be negative",
            ));
        }
        let fees = parse_non_negative(&label, "fees", record.fees.as_deref())?;
        // Per-unit cost and fee must be representable for lot matching
        let unit_total = consideration
            .checked_div(quantity)
            .zip(fees.checked_div(quantity))
            .and_then(|(cost, fee)| cost.checked_add(fee));
        if unit_total.is_none() {
            return Err(TaxError::parse(
                &label,
                "quantity",
                &record.quantity,
                "too small for the consideration or fees",
            ));
        }

        Ok(Transaction {
            id: record.id.clone(),
            asset: record.asset.trim().to_uppercase(),
            kind,
            datetime,
            consideration,
            quantity,
            fees,
        })
    }
}

/// Parse raw records, failing on the first malformed one.
pub fn parse_transactions(records: &[TransactionRecord]) -> Result<Vec<Transaction>, TaxError> {
    records.iter().map(Transaction::try_from).collect()
}

/// Read transaction records from CSV (header row uses `TransactionRecord` field names)
pub fn read_transactions_csv<R: Read>(reader: R) -> anyhow::Result<Vec<TransactionRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: TransactionRecord = result?;
        records.push(record);
    }
    Ok(records)
}
