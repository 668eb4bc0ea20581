use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::tax::brackets::TaxBracket;

/// Financial year running 1 July to 30 June.
/// The value is the end year (e.g., 2025 = 2024-25 financial year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FinancialYear(pub i32);

impl FinancialYear {
    /// Financial year containing a date
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() >= 7 {
            FinancialYear(date.year() + 1)
        } else {
            FinancialYear(date.year())
        }
    }

    /// 1 July of the previous calendar year
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 - 1, 7, 1).unwrap_or(NaiveDate::MIN)
    }

    /// 30 June
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 6, 30).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// Display as "2024-25"
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0 - 1, self.0.rem_euclid(100))
    }

    /// Resident individual income tax brackets for this year.
    pub fn default_brackets(&self) -> Vec<TaxBracket> {
        match self.0 {
            // 2024-25 onwards (stage 3 rates)
            2025.. => vec![
                TaxBracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0)),
                TaxBracket::new(dec!(18201), Some(dec!(45000)), dec!(16), dec!(0)),
                TaxBracket::new(dec!(45001), Some(dec!(135000)), dec!(30), dec!(4288)),
                TaxBracket::new(dec!(135001), Some(dec!(190000)), dec!(37), dec!(31288)),
                TaxBracket::new(dec!(190001), None, dec!(45), dec!(51638)),
            ],
            // 2023-24 and earlier
            _ => vec![
                TaxBracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0)),
                TaxBracket::new(dec!(18201), Some(dec!(45000)), dec!(19), dec!(0)),
                TaxBracket::new(dec!(45001), Some(dec!(120000)), dec!(32.5), dec!(5092)),
                TaxBracket::new(dec!(120001), Some(dec!(180000)), dec!(37), dec!(29467)),
                TaxBracket::new(dec!(180001), None, dec!(45), dec!(51667)),
            ],
        }
    }

    /// Work-from-home fixed rate per hour.
    pub fn wfh_hourly_rate(&self) -> Decimal {
        match self.0 {
            2025.. => dec!(0.70),
            _ => dec!(0.67),
        }
    }
}

impl std::fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
