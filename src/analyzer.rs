//! Core transaction query engine.
//!
//! Owns a loaded collection of transactions and answers aggregate, filter,
//! ranking and lookup queries over it with direct linear scans. The
//! collection is either loaded (possibly empty) or absent after a failed
//! load; every query checks this first.

use crate::amount::Amount;
use crate::calendar::{self, MonthCount};
use crate::error::{AnalyzerError, Result};
use crate::storage::{self, SourceFormat};
use crate::transaction::{NewTransaction, Transaction, TransactionRecord};
use chrono::Datelike;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

/// Which of `debit` and `credit` occurs more often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DominantType {
    Debit,
    Credit,
    #[default]
    Equals,
}

impl fmt::Display for DominantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DominantType::Debit => "debit",
            DominantType::Credit => "credit",
            DominantType::Equals => "equals",
        };
        f.write_str(s)
    }
}

/// The transaction query engine.
///
/// # Load State
///
/// `transactions` is `None` after a failed load. Queries on a failed or empty
/// collection return [`AnalyzerError::EmptyOrInvalidCollection`]; the `Ok`
/// types all implement `Default`, so `unwrap_or_default()` gives the zero or
/// empty result.
///
/// # Ids
///
/// Transaction ids are 1-based positions in the collection, and
/// [`find_transaction_by_id`](Self::find_transaction_by_id) indexes by
/// position. Nothing removes or reorders records, so ids stay valid.
pub struct TransactionAnalyzer {
    transactions: Option<Vec<Transaction>>,
}

impl TransactionAnalyzer {
    /// Validates already-deserialized records into a collection.
    ///
    /// An invalid record puts the analyzer in failed-load state.
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self::from_load(storage::parse_records(records))
    }

    /// Loads a collection from a JSON or CSV reader.
    pub fn from_reader<R: Read>(reader: R, format: SourceFormat) -> Self {
        Self::from_load(storage::load(reader, format))
    }

    /// Loads a collection from a `.json` or `.csv` file.
    ///
    /// A missing, unreadable or malformed file is logged and leaves the
    /// analyzer in failed-load state.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let analyzer = Self::from_load(storage::load_path(path));
        if analyzer.is_loaded() {
            info!("Loaded {} transactions from {}", analyzer.len(), path.display());
        }
        analyzer
    }

    /// Wraps transactions that were validated elsewhere.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        TransactionAnalyzer {
            transactions: Some(transactions),
        }
    }

    /// An analyzer in failed-load state.
    pub fn failed() -> Self {
        TransactionAnalyzer { transactions: None }
    }

    fn from_load(result: Result<Vec<Transaction>>) -> Self {
        match result {
            Ok(transactions) => Self::from_transactions(transactions),
            Err(e) => {
                error!("Failed to load transactions: {}", e);
                Self::failed()
            }
        }
    }

    /// Returns `true` unless the load failed.
    pub fn is_loaded(&self) -> bool {
        self.transactions.is_some()
    }

    /// Number of transactions, zero when the load failed.
    pub fn len(&self) -> usize {
        self.transactions.as_ref().map_or(0, Vec::len)
    }

    /// Returns `true` when there is nothing to query.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Guard clause shared by every read.
    fn loaded(&self) -> Result<&[Transaction]> {
        match self.transactions.as_deref() {
            Some(transactions) if !transactions.is_empty() => Ok(transactions),
            Some(_) => {
                warn!("Query on an empty transaction collection");
                Err(AnalyzerError::EmptyOrInvalidCollection)
            }
            None => {
                warn!("Query on a transaction collection that failed to load");
                Err(AnalyzerError::EmptyOrInvalidCollection)
            }
        }
    }

    fn filter<F>(&self, predicate: F) -> Result<Vec<&Transaction>>
    where
        F: Fn(&Transaction) -> bool,
    {
        Ok(self.loaded()?.iter().filter(|tx| predicate(*tx)).collect())
    }

    /// Appends a transaction with id `len + 1` and returns it.
    ///
    /// Works on an empty collection but not after a failed load. Nothing is
    /// written to storage; call [`save`](Self::save) for that.
    pub fn add_transaction(&mut self, new_tx: NewTransaction) -> Result<&Transaction> {
        let Some(transactions) = self.transactions.as_mut() else {
            warn!("Cannot append to a transaction collection that failed to load");
            return Err(AnalyzerError::EmptyOrInvalidCollection);
        };

        let id = transactions.len() + 1;
        transactions.push(new_tx.into_transaction(id));
        debug!("Appended transaction {}", id);

        Ok(&transactions[id - 1])
    }

    /// All transactions in load order.
    pub fn all_transactions(&self) -> Result<&[Transaction]> {
        self.loaded()
    }

    /// Distinct `transaction_type` values.
    pub fn unique_transaction_types(&self) -> Result<BTreeSet<&str>> {
        Ok(self.loaded()?.iter().map(|tx| tx.kind.as_str()).collect())
    }

    /// Sum of all amounts.
    pub fn total_amount(&self) -> Result<Amount> {
        sum_amounts(self.loaded()?.iter().map(|tx| tx.amount))
    }

    /// Sum of amounts whose date matches every supplied component.
    ///
    /// `None` components match anything, so `(None, None, None)` equals
    /// [`total_amount`](Self::total_amount).
    pub fn total_amount_by_date(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
    ) -> Result<Amount> {
        sum_amounts(
            self.loaded()?
                .iter()
                .filter(|tx| {
                    year.map_or(true, |y| tx.date.year() == y)
                        && month.map_or(true, |m| tx.date.month() == m)
                        && day.map_or(true, |d| tx.date.day() == d)
                })
                .map(|tx| tx.amount),
        )
    }

    /// Transactions whose type equals `kind` exactly.
    pub fn transactions_by_type(&self, kind: &str) -> Result<Vec<&Transaction>> {
        self.filter(|tx| tx.kind == kind)
    }

    /// Transactions dated within `[start, end]`, both `YYYY-MM-DD`.
    ///
    /// Dates compare as `YYYYMMDD` integers. `start` must be strictly before
    /// `end`.
    pub fn transactions_in_date_range(&self, start: &str, end: &str) -> Result<Vec<&Transaction>> {
        let transactions = self.loaded()?;
        let first = parse_date_key(start)?;
        let last = parse_date_key(end)?;

        if first >= last {
            warn!("Invalid date range {} to {}", start, end);
            return Err(AnalyzerError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(transactions
            .iter()
            .filter(|tx| (first..=last).contains(&tx.date_key()))
            .collect())
    }

    /// Transactions whose merchant name equals `merchant_name` exactly.
    pub fn transactions_by_merchant(&self, merchant_name: &str) -> Result<Vec<&Transaction>> {
        self.filter(|tx| tx.merchant_name == merchant_name)
    }

    /// Mean amount across the collection.
    pub fn average_transaction_amount(&self) -> Result<Amount> {
        let transactions = self.loaded()?;
        let total = sum_amounts(transactions.iter().map(|tx| tx.amount))?;
        total
            .divide_by_count(transactions.len())
            .ok_or(AnalyzerError::EmptyOrInvalidCollection)
    }

    /// Transactions with an amount in `[min, max]`. `max` must exceed `min`.
    pub fn transactions_by_amount_range(&self, min: Amount, max: Amount) -> Result<Vec<&Transaction>> {
        let transactions = self.loaded()?;

        if max <= min {
            warn!("Invalid amount range {} to {}", min, max);
            return Err(AnalyzerError::InvalidAmountRange { min, max });
        }

        Ok(transactions
            .iter()
            .filter(|tx| tx.amount >= min && tx.amount <= max)
            .collect())
    }

    /// Sum of amounts of `debit` transactions.
    pub fn total_debit_amount(&self) -> Result<Amount> {
        sum_amounts(
            self.loaded()?
                .iter()
                .filter(|tx| tx.is_debit())
                .map(|tx| tx.amount),
        )
    }

    /// Month or months with the most transactions, ties included.
    pub fn most_transactions_month(&self) -> Result<Vec<MonthCount>> {
        let transactions = self.loaded()?;
        let counts = calendar::tally_months(transactions.iter().map(|tx| tx.date));
        Ok(calendar::busiest_months(counts))
    }

    /// Month or months with the most `debit` transactions, ties included.
    pub fn most_debit_transactions_month(&self) -> Result<Vec<MonthCount>> {
        let transactions = self.loaded()?;
        let counts = calendar::tally_months(
            transactions
                .iter()
                .filter(|tx| tx.is_debit())
                .map(|tx| tx.date),
        );
        Ok(calendar::busiest_months(counts))
    }

    /// Compares the number of `debit` and `credit` transactions.
    ///
    /// Other types are ignored.
    pub fn most_transaction_type(&self) -> Result<DominantType> {
        let (debits, credits) = self
            .loaded()?
            .iter()
            .fold((0usize, 0usize), |(d, c), tx| {
                if tx.is_debit() {
                    (d + 1, c)
                } else if tx.is_credit() {
                    (d, c + 1)
                } else {
                    (d, c)
                }
            });

        Ok(match debits.cmp(&credits) {
            std::cmp::Ordering::Greater => DominantType::Debit,
            std::cmp::Ordering::Less => DominantType::Credit,
            std::cmp::Ordering::Equal => DominantType::Equals,
        })
    }

    /// Transactions dated strictly before `date` (`YYYY-MM-DD`).
    pub fn transactions_before_date(&self, date: &str) -> Result<Vec<&Transaction>> {
        let transactions = self.loaded()?;
        let cutoff = parse_date_key(date)?;
        Ok(transactions
            .iter()
            .filter(|tx| tx.date_key() < cutoff)
            .collect())
    }

    /// The transaction at 1-based position `id`.
    pub fn find_transaction_by_id(&self, id: usize) -> Result<&Transaction> {
        let transactions = self.loaded()?;
        id.checked_sub(1)
            .and_then(|index| transactions.get(index))
            .ok_or_else(|| {
                debug!("Transaction {} outside 1..={}", id, transactions.len());
                AnalyzerError::NotFound { id }
            })
    }

    /// Descriptions in collection order.
    pub fn transaction_descriptions(&self) -> Result<Vec<&str>> {
        Ok(self
            .loaded()?
            .iter()
            .map(|tx| tx.description.as_str())
            .collect())
    }

    /// Writes the collection, including appended records, to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let transactions = self.loaded()?;
        storage::save_path(path, transactions)?;
        info!("Saved {} transactions to {}", transactions.len(), path.display());
        Ok(())
    }

    /// Writes the collection to any writer.
    pub fn write_records<W: Write>(&self, writer: W, format: SourceFormat) -> Result<()> {
        storage::write_records(writer, self.loaded()?, format)
    }

    /// Writes a plain-text report of every aggregate.
    pub fn write_summary<W: Write>(&self, mut writer: W) -> Result<()> {
        if self.loaded().is_err() {
            writeln!(writer, "No transaction data available")?;
            writer.flush()?;
            return Ok(());
        }

        let types: Vec<&str> = self.unique_transaction_types()?.into_iter().collect();

        writeln!(writer, "Transactions: {}", self.len())?;
        writeln!(writer, "Types: {}", types.join(", "))?;
        writeln!(writer, "Total amount: {}", or_message(self.total_amount()))?;
        writeln!(
            writer,
            "Average amount: {}",
            or_message(self.average_transaction_amount())
        )?;
        writeln!(
            writer,
            "Total debit amount: {}",
            or_message(self.total_debit_amount())
        )?;
        writeln!(writer, "Most common type: {}", self.most_transaction_type()?)?;
        writeln!(
            writer,
            "Busiest month: {}",
            join_months(&self.most_transactions_month()?)
        )?;
        writeln!(
            writer,
            "Busiest debit month: {}",
            join_months(&self.most_debit_transactions_month()?)
        )?;

        writer.flush()?;
        Ok(())
    }
}

fn parse_date_key(s: &str) -> Result<i64> {
    calendar::parse_date(s)
        .map(calendar::date_key)
        .ok_or_else(|| {
            warn!("Invalid date argument '{}'", s);
            AnalyzerError::InvalidDate(s.to_string())
        })
}

fn sum_amounts<I>(amounts: I) -> Result<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    Amount::checked_sum(amounts).ok_or_else(|| {
        warn!("Amount overflow while summing transactions");
        AnalyzerError::AmountOverflow
    })
}

fn or_message<T: fmt::Display>(result: Result<T>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => e.to_string(),
    }
}

fn join_months(months: &[MonthCount]) -> String {
    months
        .iter()
        .map(MonthCount::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
