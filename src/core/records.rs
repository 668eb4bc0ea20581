use super::transaction::TransactionRecord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// All records for one profile and one financial year.
///
/// Numbers and dates are strings as entered in the application; they are
/// parsed (and validated) when the tax position is computed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaxRecords {
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
    #[serde(default)]
    pub income: Vec<IncomeRecord>,
    #[serde(default)]
    pub property_income: Vec<PropertyIncomeRecord>,
    #[serde(default)]
    pub property_expenses: Vec<PropertyExpenseRecord>,
    #[serde(default)]
    pub receipts: Vec<ReceiptRecord>,
    #[serde(default)]
    pub work_from_home: Option<WorkFromHomeRecord>,
    #[serde(default)]
    pub depreciable_assets: Vec<DepreciableAssetRecord>,
    /// Full buy/sell history; earlier years feed FIFO matching
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

/// Property held (fully or jointly) by the profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PropertyRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Share owned by this profile, 0-100 (defaults to 100)
    #[serde(default)]
    pub ownership_percent: Option<String>,
}

/// General income (salary, interest, dividends, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IncomeRecord {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    pub amount: String,
}

/// Income received for a property
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PropertyIncomeRecord {
    pub id: String,
    pub property_id: String,
    pub date: String,
    #[serde(default)]
    pub gross_rent: Option<String>,
    #[serde(default)]
    pub insurance_payout: Option<String>,
    #[serde(default)]
    pub other_income: Option<String>,
}

/// Expense paid for a property
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PropertyExpenseRecord {
    pub id: String,
    pub property_id: String,
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    pub amount: String,
    /// Capital improvements are not deductible in the year they are paid
    #[serde(default)]
    pub capital_improvement: bool,
}

/// Deductible receipt (work-related expense, donation, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReceiptRecord {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: String,
}

/// Work-from-home claim, one per financial year
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum WorkFromHomeRecord {
    /// Hours worked from home times the configured hourly rate
    FixedRate { hours: String },
    /// Itemised running costs
    ActualCost {
        #[serde(default)]
        electricity: Option<String>,
        #[serde(default)]
        gas: Option<String>,
        #[serde(default)]
        internet: Option<String>,
        #[serde(default)]
        phone: Option<String>,
        #[serde(default)]
        stationery: Option<String>,
        #[serde(default)]
        equipment_repairs: Option<String>,
        #[serde(default)]
        cleaning: Option<String>,
        #[serde(default)]
        other: Option<String>,
    },
}

/// Asset depreciated over its effective life
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DepreciableAssetRecord {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost: String,
    /// Effective life in years (may be fractional)
    pub effective_life: String,
    pub acquisition_date: String,
    /// diminishing_value or prime_cost
    pub method: String,
    /// Business use, 0-100 (defaults to 100)
    #[serde(default)]
    pub business_use_percent: Option<String>,
}

impl DepreciableAssetRecord {
    pub fn label(&self) -> String {
        asset_label(&self.id, self.description.as_deref())
    }
}

/// `'id' (description)` as used in asset error messages
pub(crate) fn asset_label(id: &str, description: Option<&str>) -> String {
    match description {
        Some(d) => format!("'{}' ({})", id, d),
        None => format!("'{}'", id),
    }
}

/// Read the JSON record file
pub fn read_records_json<R: Read>(reader: R) -> anyhow::Result<TaxRecords> {
    let records: TaxRecords = serde_json::from_reader(reader)?;
    Ok(records)
}
