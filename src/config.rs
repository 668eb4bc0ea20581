//! Caller-managed configuration: the bracket table and rates the end user can edit.

use crate::core::FinancialYear;
use crate::tax::brackets::TaxBracket;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxConfig {
    pub brackets: Vec<TaxBracket>,
    /// Work-from-home fixed rate per hour
    #[schemars(with = "f64")]
    pub wfh_hourly_rate: Decimal,
}

/// Config file contents; missing keys fall back to the year's defaults
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TaxConfigFile {
    #[serde(default)]
    pub brackets: Option<Vec<TaxBracket>>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub wfh_hourly_rate: Option<Decimal>,
}

impl TaxConfig {
    /// Built-in rates for `year`
    pub fn for_year(year: FinancialYear) -> Self {
        TaxConfig {
            brackets: year.default_brackets(),
            wfh_hourly_rate: year.wfh_hourly_rate(),
        }
    }

    /// Read a JSON config, filling anything it leaves out from `year`'s defaults
    pub fn from_reader<R: Read>(reader: R, year: FinancialYear) -> anyhow::Result<Self> {
        let file: TaxConfigFile = serde_json::from_reader(reader)?;
        Ok(TaxConfig::from_file(file, year))
    }

    pub fn from_file(file: TaxConfigFile, year: FinancialYear) -> Self {
        let defaults = TaxConfig::for_year(year);
        TaxConfig {
            brackets: file.brackets.unwrap_or(defaults.brackets),
            wfh_hourly_rate: file.wfh_hourly_rate.unwrap_or(defaults.wfh_hourly_rate),
        }
    }
}
