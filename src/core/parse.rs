//! Field parsers for string-valued records.
//!
//! Records hold numbers and dates as entered by the user. These helpers turn
//! them into typed values and report failures against the owning record.

use super::error::TaxError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Parse a required decimal amount. Accepts a leading `$` and `,` separators.
pub fn parse_amount(record: &str, field: &'static str, value: &str) -> Result<Decimal, TaxError> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Err(TaxError::parse(record, field, value, "value is empty"));
    }
    Decimal::from_str(&cleaned)
        .map_err(|e| TaxError::parse(record, field, value, e.to_string()))
}

/// Parse an optional amount; absent or blank values are zero.
pub fn parse_optional_amount(
    record: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Decimal, TaxError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_amount(record, field, v),
        _ => Ok(Decimal::ZERO),
    }
}

/// Parse an amount that must not be negative.
pub fn parse_non_negative(
    record: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Decimal, TaxError> {
    let amount = parse_optional_amount(record, field, value)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TaxError::parse(
            record,
            field,
            value.unwrap_or_default(),
            "must not be negative",
        ));
    }
    Ok(amount)
}

/// Parse a 0-100 percentage into a fraction. Absent values mean 100%.
pub fn parse_percent(
    record: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Decimal, TaxError> {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(Decimal::ONE);
    };
    let percent = parse_amount(record, field, raw.trim().trim_end_matches('%'))?;
    if percent < Decimal::ZERO || percent > dec!(100) {
        return Err(TaxError::parse(record, field, raw, "must be between 0 and 100"));
    }
    Ok(percent / dec!(100))
}

/// Parse a timestamp. Date-only values are midnight UTC.
pub fn parse_datetime(
    record: &str,
    field: &'static str,
    value: &str,
) -> Result<DateTime<FixedOffset>, TaxError> {
    let s = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }
    Err(TaxError::parse(
        record,
        field,
        value,
        "expected YYYY-MM-DD or an RFC 3339 timestamp",
    ))
}

/// Parse a calendar date, ignoring any time component.
pub fn parse_date(record: &str, field: &'static str, value: &str) -> Result<NaiveDate, TaxError> {
    parse_datetime(record, field, value).map(|dt| dt.date_naive())
}
