//! Error types for the transaction analyzer.

use crate::amount::Amount;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Errors that can occur while loading, querying or saving transactions.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Failed to open, read or write a transaction file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing or serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A record that could not be validated into a transaction
    #[error("Invalid transaction at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// File extension is neither `.json` nor `.csv`
    #[error("Unsupported transaction file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Query made while the collection is absent (failed load) or empty
    #[error("No transaction data available")]
    EmptyOrInvalidCollection,

    /// A query date that is not `YYYY-MM-DD`
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Date range whose start is not before its end
    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: String, end: String },

    /// Amount range whose maximum is not above its minimum
    #[error("Invalid amount range: max {max} must be greater than min {min}")]
    InvalidAmountRange { min: Amount, max: Amount },

    /// A sum that left the representable amount range
    #[error("Amount overflow while summing transactions")]
    AmountOverflow,

    /// Positional lookup outside `[1, count]`
    #[error("Transaction {id} not found")]
    NotFound { id: usize },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: transaction-analyzer <transactions.json|csv>")]
    MissingArgument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AnalyzerError::InvalidDateRange {
            start: "2019-02-01".to_string(),
            end: "2019-01-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: start 2019-02-01 must be before end 2019-01-01"
        );
        assert_eq!(
            AnalyzerError::NotFound { id: 9 }.to_string(),
            "Transaction 9 not found"
        );
        assert_eq!(
            AnalyzerError::AmountOverflow.to_string(),
            "Amount overflow while summing transactions"
        );
    }
}
