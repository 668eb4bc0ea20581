use crate::core::parse::{parse_amount, parse_date, parse_percent};
use crate::core::records::asset_label;
use crate::core::{DepreciableAssetRecord, TaxError};
use chrono::{Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Divisor for the pro-rata fraction. Leap years are not special-cased, so a
/// full 366-day window claims 366/365 of the annual amount.
const DAYS_IN_YEAR: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    /// Accelerated: 200% of the straight-line rate
    DiminishingValue,
    /// Straight line over the effective life
    PrimeCost,
}

impl FromStr for DepreciationMethod {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "diminishing_value" | "dv" => Ok(DepreciationMethod::DiminishingValue),
            "prime_cost" | "pc" => Ok(DepreciationMethod::PrimeCost),
            _ => Err("expected diminishing_value or prime_cost"),
        }
    }
}

impl DepreciationMethod {
    /// Multiple of `1 / effective_life` claimed per full year
    fn rate_multiplier(self) -> Decimal {
        match self {
            DepreciationMethod::DiminishingValue => dec!(2),
            DepreciationMethod::PrimeCost => dec!(1),
        }
    }
}

/// Parsed depreciable asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepreciableAsset {
    pub id: String,
    pub description: Option<String>,
    pub cost: Decimal,
    /// Effective life in years
    pub effective_life: Decimal,
    pub acquired: NaiveDate,
    pub method: DepreciationMethod,
    /// 0..=1
    pub business_use: Decimal,
}

impl DepreciableAsset {
    fn label(&self) -> String {
        asset_label(&self.id, self.description.as_deref())
    }

    fn validate(&self) -> Result<(), TaxError> {
        if self.effective_life <= Decimal::ZERO {
            return Err(TaxError::invalid_asset(
                self.label(),
                format!("effective life must be positive, got {}", self.effective_life),
            ));
        }
        if self.cost <= Decimal::ZERO {
            return Err(TaxError::invalid_asset(
                self.label(),
                format!("cost must be positive, got {}", self.cost),
            ));
        }
        if self.business_use < Decimal::ZERO || self.business_use > Decimal::ONE {
            return Err(TaxError::invalid_asset(
                self.label(),
                format!("business use must be between 0 and 1, got {}", self.business_use),
            ));
        }
        Ok(())
    }
}

impl TryFrom<&DepreciableAssetRecord> for DepreciableAsset {
    type Error = TaxError;

    fn try_from(record: &DepreciableAssetRecord) -> Result<Self, Self::Error> {
        let label = format!("depreciable asset {}", record.label());
        let method: DepreciationMethod = record
            .method
            .parse()
            .map_err(|reason| TaxError::parse(&label, "method", &record.method, reason))?;
        Ok(DepreciableAsset {
            id: record.id.clone(),
            description: record.description.clone(),
            cost: parse_amount(&label, "cost", &record.cost)?,
            effective_life: parse_amount(&label, "effective_life", &record.effective_life)?,
            acquired: parse_date(&label, "acquisition_date", &record.acquisition_date)?,
            method,
            business_use: parse_percent(
                &label,
                "business_use_percent",
                record.business_use_percent.as_deref(),
            )?,
        })
    }
}

/// Deduction for `asset` in the financial year ending `fy_end`.
///
/// The year window is `[fy_end - 1 year + 1 day, fy_end]`. The claim is
/// pro-rated by days held over a fixed 365-day year and recomputed from the
/// original cost each time (no written-down value is carried between years).
pub fn compute_depreciation(asset: &DepreciableAsset, fy_end: NaiveDate) -> Result<Decimal, TaxError> {
    asset.validate()?;

    let window_start = fy_end
        .checked_sub_months(Months::new(12))
        .map(|d| d + Duration::days(1))
        .unwrap_or(fy_end);
    let start = asset.acquired.max(window_start);
    if start > fy_end {
        return Ok(Decimal::ZERO);
    }

    let days_held = (fy_end - start).num_days() + 1;
    let deduction = asset.cost * asset.method.rate_multiplier() * Decimal::from(days_held)
        / (asset.effective_life * Decimal::from(DAYS_IN_YEAR))
        * asset.business_use;

    log::debug!(
        "Depreciation {}: {:?} cost={} life={} days={} business_use={} => {}",
        asset.id,
        asset.method,
        asset.cost,
        asset.effective_life,
        days_held,
        asset.business_use,
        deduction
    );
    Ok(deduction)
}

/// Deduction per asset, keeping failures separate so one bad asset does not
/// hide the rest.
pub fn depreciation_schedule(
    records: &[DepreciableAssetRecord],
    fy_end: NaiveDate,
) -> Vec<(String, Result<Decimal, TaxError>)> {
    records
        .iter()
        .map(|record| {
            let result = DepreciableAsset::try_from(record)
                .and_then(|asset| compute_depreciation(&asset, fy_end));
            (record.id.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn asset(cost: Decimal, life: Decimal, acquired: &str, method: DepreciationMethod) -> DepreciableAsset {
        DepreciableAsset {
            id: "a1".to_string(),
            description: None,
            cost,
            effective_life: life,
            acquired: date(acquired),
            method,
            business_use: Decimal::ONE,
        }
    }

    #[test]
    fn prime_cost_part_year() {
        let a = asset(dec!(3000), dec!(5), "2024-01-01", DepreciationMethod::PrimeCost);
        let d = compute_depreciation(&a, date("2024-06-30")).unwrap();
        // 182 days held (1 Jan - 30 Jun inclusive)
        assert_eq!(d.round_dp(2), dec!(299.18));
    }

    #[test]
    fn diminishing_value_doubles_rate() {
        let a = asset(dec!(3000), dec!(5), "2024-01-01", DepreciationMethod::DiminishingValue);
        let d = compute_depreciation(&a, date("2024-06-30")).unwrap();
        assert_eq!(d.round_dp(2), dec!(598.36));
    }

    #[test]
    fn full_year_held() {
        let a = asset(dec!(3650), dec!(10), "2020-03-15", DepreciationMethod::PrimeCost);
        // 2022-23 window has 365 days
        assert_eq!(compute_depreciation(&a, date("2023-06-30")).unwrap(), dec!(365));
        // 2023-24 window has 366 days over the fixed 365-day year
        assert_eq!(compute_depreciation(&a, date("2024-06-30")).unwrap(), dec!(366));
    }

    #[test]
    fn acquired_after_year_end() {
        let a = asset(dec!(3000), dec!(5), "2024-07-01", DepreciationMethod::PrimeCost);
        assert_eq!(compute_depreciation(&a, date("2024-06-30")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn acquired_on_last_day() {
        let a = asset(dec!(3650), dec!(1), "2024-06-30", DepreciationMethod::PrimeCost);
        assert_eq!(compute_depreciation(&a, date("2024-06-30")).unwrap(), dec!(10));
    }

    #[test]
    fn business_use_scales_deduction() {
        let mut a = asset(dec!(3650), dec!(10), "2020-01-01", DepreciationMethod::PrimeCost);
        a.business_use = dec!(0.6);
        assert_eq!(compute_depreciation(&a, date("2023-06-30")).unwrap(), dec!(219));
    }

    #[test]
    fn fractional_life() {
        let a = asset(dec!(1000), dec!(2.5), "2020-01-01", DepreciationMethod::PrimeCost);
        assert_eq!(compute_depreciation(&a, date("2023-06-30")).unwrap(), dec!(400));
    }

    #[test]
    fn non_positive_life_is_invalid() {
        let a = asset(dec!(1000), dec!(0), "2020-01-01", DepreciationMethod::PrimeCost);
        let err = compute_depreciation(&a, date("2023-06-30")).unwrap_err();
        assert!(matches!(err, TaxError::InvalidAsset { .. }));
        assert!(err.to_string().contains("'a1'"));

        let a = asset(dec!(1000), dec!(-3), "2020-01-01", DepreciationMethod::PrimeCost);
        assert!(compute_depreciation(&a, date("2023-06-30")).is_err());
    }

    #[test]
    fn non_positive_cost_is_invalid() {
        let a = asset(dec!(0), dec!(5), "2020-01-01", DepreciationMethod::PrimeCost);
        assert!(matches!(
            compute_depreciation(&a, date("2023-06-30")),
            Err(TaxError::InvalidAsset { .. })
        ));
    }

    #[test]
    fn method_aliases() {
        assert_eq!(
            "Diminishing Value".parse::<DepreciationMethod>(),
            Ok(DepreciationMethod::DiminishingValue)
        );
        assert_eq!("prime-cost".parse::<DepreciationMethod>(), Ok(DepreciationMethod::PrimeCost));
        assert!("sum_of_digits".parse::<DepreciationMethod>().is_err());
    }

    fn record(id: &str, life: &str) -> DepreciableAssetRecord {
        DepreciableAssetRecord {
            id: id.to_string(),
            description: Some("Desk".to_string()),
            cost: "$1,825".to_string(),
            effective_life: life.to_string(),
            acquisition_date: "2019-07-01".to_string(),
            method: "prime_cost".to_string(),
            business_use_percent: Some("50".to_string()),
        }
    }

    #[test]
    fn parses_record() {
        let a = DepreciableAsset::try_from(&record("d1", "5")).unwrap();
        assert_eq!(a.cost, dec!(1825));
        assert_eq!(a.business_use, dec!(0.5));
        assert_eq!(a.method, DepreciationMethod::PrimeCost);
        // 1825 / 5 * 0.5
        assert_eq!(compute_depreciation(&a, date("2023-06-30")).unwrap(), dec!(182.5));
    }

    #[test]
    fn schedule_isolates_bad_assets() {
        let records = vec![record("ok", "5"), record("bad", "five"), record("zero", "0")];
        let schedule = depreciation_schedule(&records, date("2023-06-30"));
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].1.as_ref().unwrap(), &dec!(182.5));
        assert!(matches!(schedule[1].1, Err(TaxError::Parse { .. })));
        assert!(matches!(schedule[2].1, Err(TaxError::InvalidAsset { .. })));
    }
}
