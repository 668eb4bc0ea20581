use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Non-fatal conditions raised during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// A disposal sold more units than the recorded acquisitions held.
    /// The unmatched quantity is given a zero cost base.
    /// When `matched = 0` there was no cost base at all.
    UnmatchedDisposal {
        transaction_id: String,
        asset: String,
        date: NaiveDate,
        #[schemars(with = "f64")]
        required: Decimal,
        #[schemars(with = "f64")]
        matched: Decimal,
    },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::UnmatchedDisposal { matched, .. } if matched.is_zero() => "NoCostBase",
            Warning::UnmatchedDisposal { .. } => "UnmatchedDisposal",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnmatchedDisposal {
                transaction_id,
                asset,
                date,
                required,
                matched,
            } => write!(
                f,
                "disposal '{}' of {} {} on {} matched only {} against recorded acquisitions; \
                 the remaining {} has a zero cost base",
                transaction_id,
                required.normalize(),
                asset,
                date,
                matched.normalize(),
                (*required - *matched).normalize()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn unmatched(matched: Decimal) -> Warning {
        Warning::UnmatchedDisposal {
            transaction_id: "tx-9".to_string(),
            asset: "ETH".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            required: dec!(2.5),
            matched,
        }
    }

    #[test]
    fn kind_distinguishes_missing_history() {
        assert_eq!(unmatched(dec!(0)).kind(), "NoCostBase");
        assert_eq!(unmatched(dec!(1)).kind(), "UnmatchedDisposal");
    }

    #[test]
    fn display_reports_shortfall() {
        let msg = unmatched(dec!(1.0)).to_string();
        assert!(msg.contains("tx-9"));
        assert!(msg.contains("remaining 1.5"));
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(unmatched(dec!(1))).unwrap();
        assert_eq!(json["type"], "UnmatchedDisposal");
        assert_eq!(json["asset"], "ETH");
    }
}
