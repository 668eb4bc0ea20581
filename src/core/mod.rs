pub mod error;
pub mod parse;
pub mod records;
pub mod transaction;
pub mod warnings;
pub mod year;

// Flat public surface for domain types and functions.
pub use error::TaxError;
pub use records::{
    read_records_json, DepreciableAssetRecord, IncomeRecord, PropertyExpenseRecord,
    PropertyIncomeRecord, PropertyRecord, ReceiptRecord, TaxRecords, WorkFromHomeRecord,
};
pub use transaction::{
    parse_transactions, read_transactions_csv, CsvField, Transaction, TransactionKind,
    TransactionRecord,
};
pub use warnings::Warning;
pub use year::FinancialYear;
