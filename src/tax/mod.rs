pub mod brackets;
pub mod cgt;
pub mod depreciation;
pub mod position;

pub use brackets::{compute_tax, validate_brackets, BracketIssue, TaxBracket};
pub use cgt::{compute_capital_gains, CapitalGainsSummary, DisposalEvent, MatchedLot};
pub use depreciation::{
    compute_depreciation, depreciation_schedule, DepreciableAsset, DepreciationMethod,
};
pub use position::{aggregate, TaxPosition};
