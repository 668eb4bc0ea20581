use crate::core::TaxError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One row of a progressive tax table.
///
/// `min_income` is the first whole dollar taxed at `rate`; `base_tax` is the
/// tax already payable on all income below `min_income`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxBracket {
    #[schemars(with = "f64")]
    pub min_income: Decimal,
    /// `None` for the unbounded top bracket
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub max_income: Option<Decimal>,
    /// Marginal rate as a percentage (e.g. 30 for 30%)
    #[schemars(with = "f64")]
    pub rate: Decimal,
    #[schemars(with = "f64")]
    pub base_tax: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate: Decimal,
        base_tax: Decimal,
    ) -> Self {
        TaxBracket {
            min_income,
            max_income,
            rate,
            base_tax,
        }
    }

    fn contains(&self, income: Decimal) -> bool {
        income >= self.min_income && self.max_income.is_none_or(|max| income <= max)
    }
}

/// Tax payable on `taxable_income` under `brackets`.
///
/// The bracket is chosen by whole dollars of income, so cents between one
/// bracket's max and the next one's min stay in the lower bracket. The tax
/// itself is `base_tax + (income - min_income + 1) * rate / 100` on the exact
/// income; the `+ 1` is part of the bracket table convention (floors are the
/// first dollar of the bracket).
pub fn compute_tax(taxable_income: Decimal, brackets: &[TaxBracket]) -> Result<Decimal, TaxError> {
    if taxable_income <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let whole_dollars = taxable_income.trunc();

    let mut sorted: Vec<&TaxBracket> = brackets.iter().collect();
    sorted.sort_by(|a, b| a.min_income.cmp(&b.min_income));

    let bracket = sorted
        .into_iter()
        .find(|b| b.contains(whole_dollars))
        .ok_or(TaxError::NoMatchingBracket {
            income: taxable_income,
        })?;

    let tax = bracket.base_tax
        + (taxable_income - bracket.min_income + Decimal::ONE) * bracket.rate / dec!(100);
    log::debug!(
        "Tax on {}: bracket from {} at {}% (base {}) = {}",
        taxable_income,
        bracket.min_income,
        bracket.rate,
        bracket.base_tax,
        tax
    );
    Ok(tax)
}

/// Structural problem found in a bracket table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum BracketIssue {
    Empty,
    /// Lowest bracket does not start at zero
    FirstFloorNotZero { min_income: Decimal },
    /// `previous_max + 1 != next_min`
    NotContiguous {
        previous_max: Decimal,
        next_min: Decimal,
    },
    /// Unbounded bracket followed by another bracket
    UnboundedNotLast { min_income: Decimal },
    /// Highest bracket has a maximum, so larger incomes match nothing
    BoundedTop { max_income: Decimal },
    NegativeRate { min_income: Decimal, rate: Decimal },
}

impl std::fmt::Display for BracketIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketIssue::Empty => write!(f, "bracket table is empty"),
            BracketIssue::FirstFloorNotZero { min_income } => {
                write!(f, "lowest bracket starts at {} instead of 0", min_income)
            }
            BracketIssue::NotContiguous {
                previous_max,
                next_min,
            } => write!(
                f,
                "bracket ending at {} is followed by one starting at {} (expected {})",
                previous_max,
                next_min,
                previous_max + Decimal::ONE
            ),
            BracketIssue::UnboundedNotLast { min_income } => write!(
                f,
                "unbounded bracket starting at {} is not the highest bracket",
                min_income
            ),
            BracketIssue::BoundedTop { max_income } => write!(
                f,
                "highest bracket ends at {}; incomes above it have no bracket",
                max_income
            ),
            BracketIssue::NegativeRate { min_income, rate } => {
                write!(f, "bracket starting at {} has negative rate {}%", min_income, rate)
            }
        }
    }
}

/// Check that brackets partition [0, ∞) with whole-dollar boundaries.
pub fn validate_brackets(brackets: &[TaxBracket]) -> Vec<BracketIssue> {
    let mut sorted: Vec<&TaxBracket> = brackets.iter().collect();
    sorted.sort_by(|a, b| a.min_income.cmp(&b.min_income));

    let Some(first) = sorted.first() else {
        return vec![BracketIssue::Empty];
    };

    let mut issues = Vec::new();
    if !first.min_income.is_zero() {
        issues.push(BracketIssue::FirstFloorNotZero {
            min_income: first.min_income,
        });
    }

    for b in &sorted {
        if b.rate < Decimal::ZERO {
            issues.push(BracketIssue::NegativeRate {
                min_income: b.min_income,
                rate: b.rate,
            });
        }
    }

    for pair in sorted.windows(2) {
        match pair[0].max_income {
            Some(max) if max + Decimal::ONE != pair[1].min_income => {
                issues.push(BracketIssue::NotContiguous {
                    previous_max: max,
                    next_min: pair[1].min_income,
                });
            }
            Some(_) => {}
            None => issues.push(BracketIssue::UnboundedNotLast {
                min_income: pair[0].min_income,
            }),
        }
    }

    if let Some(max_income) = sorted.last().and_then(|b| b.max_income) {
        issues.push(BracketIssue::BoundedTop { max_income });
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(18201), Some(dec!(45000)), dec!(16), dec!(0)),
            TaxBracket::new(dec!(45001), None, dec!(30), dec!(4288)),
        ]
    }

    #[test]
    fn zero_and_negative_income_pay_nothing() {
        assert_eq!(compute_tax(dec!(0), &table()).unwrap(), dec!(0));
        assert_eq!(compute_tax(dec!(-5000), &table()).unwrap(), dec!(0));
        // Even an empty table is fine when there is nothing to tax
        assert_eq!(compute_tax(dec!(0), &[]).unwrap(), dec!(0));
    }

    #[test]
    fn income_at_top_of_second_bracket() {
        // 0 + (45000 - 18201 + 1) * 16 / 100
        assert_eq!(compute_tax(dec!(45000), &table()).unwrap(), dec!(4288));
    }

    #[test]
    fn tax_free_threshold() {
        assert_eq!(compute_tax(dec!(18200), &table()).unwrap(), dec!(0));
        assert_eq!(compute_tax(dec!(18201), &table()).unwrap(), dec!(0.16));
    }

    #[test]
    fn top_bracket_unbounded() {
        // 4288 + (100000 - 45001 + 1) * 0.30
        assert_eq!(compute_tax(dec!(100000), &table()).unwrap(), dec!(20788));
    }

    #[test]
    fn continuous_at_boundaries() {
        let t = table();
        let below = compute_tax(dec!(45000), &t).unwrap();
        let above = compute_tax(dec!(45001), &t).unwrap();
        // The jump across the boundary is a single dollar at the new rate
        assert_eq!(above - below, dec!(0.30));

        let below = compute_tax(dec!(18200), &t).unwrap();
        let above = compute_tax(dec!(18201), &t).unwrap();
        assert_eq!(above - below, dec!(0.16));
    }

    #[test]
    fn cents_are_taxed_at_the_bracket_rate() {
        // 4288 + 55000.50 * 30%
        assert_eq!(compute_tax(dec!(100000.50), &table()).unwrap(), dec!(20788.15));
        // 26800.99 * 16%
        assert_eq!(compute_tax(dec!(45000.99), &table()).unwrap(), dec!(4288.1584));
    }

    #[test]
    fn cents_above_a_bracket_max_stay_in_that_bracket() {
        assert_eq!(compute_tax(dec!(18200.50), &table()).unwrap(), dec!(0));
    }

    #[test]
    fn unsorted_table_is_scanned_in_order() {
        let mut t = table();
        t.reverse();
        assert_eq!(compute_tax(dec!(45000), &t).unwrap(), dec!(4288));
    }

    #[test]
    fn gap_in_table_is_an_error() {
        let t = vec![
            TaxBracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(20001), None, dec!(16), dec!(0)),
        ];
        let err = compute_tax(dec!(19000), &t).unwrap_err();
        assert_eq!(err, TaxError::NoMatchingBracket { income: dec!(19000) });
    }

    #[test]
    fn bounded_top_is_an_error_above_it() {
        let t = vec![TaxBracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0))];
        assert!(compute_tax(dec!(50000), &t).is_err());
    }

    #[test]
    fn valid_table_has_no_issues() {
        assert!(validate_brackets(&table()).is_empty());
    }

    #[test]
    fn validation_reports_defects() {
        let t = vec![
            TaxBracket::new(dec!(1), Some(dec!(18200)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(18300), Some(dec!(45000)), dec!(-1), dec!(0)),
        ];
        let issues = validate_brackets(&t);
        assert!(issues.contains(&BracketIssue::FirstFloorNotZero { min_income: dec!(1) }));
        assert!(issues.contains(&BracketIssue::NotContiguous {
            previous_max: dec!(18200),
            next_min: dec!(18300)
        }));
        assert!(issues.contains(&BracketIssue::BoundedTop {
            max_income: dec!(45000)
        }));
        assert!(issues.contains(&BracketIssue::NegativeRate {
            min_income: dec!(18300),
            rate: dec!(-1)
        }));
        assert_eq!(validate_brackets(&[]), vec![BracketIssue::Empty]);
    }

    #[test]
    fn unbounded_in_middle_reported() {
        let t = vec![
            TaxBracket::new(dec!(0), None, dec!(0), dec!(0)),
            TaxBracket::new(dec!(18201), None, dec!(16), dec!(0)),
        ];
        assert_eq!(
            validate_brackets(&t),
            vec![BracketIssue::UnboundedNotLast { min_income: dec!(0) }]
        );
    }
}
