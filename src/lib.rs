//! # Transaction Analyzer
//!
//! Loads card transactions from a JSON or CSV file and answers analytical
//! queries over them: totals and averages, filters by type, date, amount and
//! merchant, busiest-month ranking and positional lookup.
//!
//! ## Design Principles
//!
//! - **Decimal arithmetic**: Amounts use `rust_decimal` with overflow-checked sums
//! - **Validated on load**: Malformed dates or amounts fail the whole load
//! - **Typed results**: Queries return `Result`, never print in place of a value
//! - **Explicit persistence**: Appends stay in memory until `save` is called
//!
//! ## Example
//!
//! ```no_run
//! use transaction_analyzer::TransactionAnalyzer;
//!
//! let analyzer = TransactionAnalyzer::open("transactions.json");
//! let total = analyzer.total_amount().unwrap_or_default();
//! println!("{}", total);
//! analyzer.write_summary(std::io::stdout()).unwrap();
//! ```

pub mod amount;
pub mod analyzer;
pub mod calendar;
pub mod error;
pub mod storage;
pub mod transaction;

pub use amount::Amount;
pub use analyzer::{DominantType, TransactionAnalyzer};
pub use calendar::MonthCount;
pub use error::{AnalyzerError, Result};
pub use storage::SourceFormat;
pub use transaction::{NewTransaction, Transaction, TransactionRecord, CREDIT, DEBIT};
