//! Tax position calculation: income, deductions, depreciation and FIFO
//! capital gains for one profile and financial year.

pub mod config;
pub mod core;
pub mod tax;

pub use config::TaxConfig;
pub use crate::core::{FinancialYear, TaxError, TaxRecords, Warning};
pub use tax::{aggregate, compute_capital_gains, compute_depreciation, compute_tax, TaxPosition};
