use rust_decimal::Decimal;

/// Errors raised while turning records into a tax position.
///
/// Every variant names the record that caused it so the caller can point
/// the user at the offending entry.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TaxError {
    #[error("invalid {field} '{value}' in {record}: {reason}")]
    Parse {
        record: String,
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("invalid depreciable asset {asset}: {reason}")]
    InvalidAsset { asset: String, reason: String },
    #[error("no tax bracket matches taxable income {income}")]
    NoMatchingBracket { income: Decimal },
}

impl TaxError {
    pub fn parse(
        record: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TaxError::Parse {
            record: record.into(),
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_asset(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        TaxError::InvalidAsset {
            asset: asset.into(),
            reason: reason.into(),
        }
    }
}
