//! Transaction models for source parsing and internal representation.

use crate::amount::Amount;
use crate::calendar::{self, DATE_FORMAT};
use crate::error::{AnalyzerError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Transaction type counted as money leaving the card.
pub const DEBIT: &str = "debit";

/// Transaction type counted as money arriving on the card.
pub const CREDIT: &str = "credit";

/// Raw transaction record as read from (and written back to) a source file.
///
/// Field names follow the external representation. The date stays a string
/// here and is validated by [`TransactionRecord::parse`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionRecord {
    /// Optional in sources; ids are reassigned from load position. Values
    /// that aren't a non-negative integer (or a string holding one) read as
    /// `None`.
    #[serde(default, deserialize_with = "lenient_id")]
    pub transaction_id: Option<usize>,

    /// `YYYY-MM-DD`
    pub transaction_date: String,

    pub transaction_amount: Amount,

    /// Conventionally `debit` or `credit`, but any string is kept.
    pub transaction_type: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub transaction_description: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub merchant_name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub card_type: String,
}

impl TransactionRecord {
    /// Validates the raw record into a [`Transaction`] with the given id.
    ///
    /// Returns an error message if the date is not a real `YYYY-MM-DD` date.
    pub fn parse(self, id: usize) -> std::result::Result<Transaction, String> {
        let date = calendar::parse_date(&self.transaction_date).ok_or_else(|| {
            format!(
                "transaction_date '{}' is not a valid YYYY-MM-DD date",
                self.transaction_date
            )
        })?;

        Ok(Transaction {
            id,
            date,
            amount: self.transaction_amount,
            kind: self.transaction_type,
            description: self.transaction_description,
            merchant_name: self.merchant_name,
            card_type: self.card_type,
        })
    }
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(id)
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        TransactionRecord {
            transaction_id: Some(tx.id),
            transaction_date: tx.date.format(DATE_FORMAT).to_string(),
            transaction_amount: tx.amount,
            transaction_type: tx.kind.clone(),
            transaction_description: tx.description.clone(),
            merchant_name: tx.merchant_name.clone(),
            card_type: tx.card_type.clone(),
        }
    }
}

/// A validated transaction owned by the analyzer.
///
/// `id` is the 1-based position in the collection at the time the record was
/// loaded or appended. It is not a database key: it goes stale if records are
/// ever removed or reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: usize,
    pub date: NaiveDate,
    pub amount: Amount,
    /// Opaque type string (`transaction_type` in sources)
    pub kind: String,
    pub description: String,
    pub merchant_name: String,
    pub card_type: String,
}

impl Transaction {
    /// Returns `true` if the type is exactly `debit` (case-sensitive).
    pub fn is_debit(&self) -> bool {
        self.kind == DEBIT
    }

    /// Returns `true` if the type is exactly `credit` (case-sensitive).
    pub fn is_credit(&self) -> bool {
        self.kind == CREDIT
    }

    /// The date as a `YYYYMMDD` integer, used for date comparisons.
    pub fn date_key(&self) -> i64 {
        calendar::date_key(self.date)
    }
}

/// Caller-supplied fields for a transaction to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: Amount,
    pub kind: String,
    pub description: String,
    pub merchant_name: String,
    pub card_type: String,
}

impl NewTransaction {
    /// Builds a new transaction, parsing `date` as `YYYY-MM-DD`.
    ///
    /// Returns [`AnalyzerError::InvalidDate`] if the date is malformed.
    pub fn new(
        date: &str,
        amount: Amount,
        kind: &str,
        description: &str,
        merchant_name: &str,
        card_type: &str,
    ) -> Result<Self> {
        let date = calendar::parse_date(date)
            .ok_or_else(|| AnalyzerError::InvalidDate(date.to_string()))?;

        Ok(NewTransaction {
            date,
            amount,
            kind: kind.to_string(),
            description: description.to_string(),
            merchant_name: merchant_name.to_string(),
            card_type: card_type.to_string(),
        })
    }

    /// Assigns an id and turns this into a stored transaction.
    pub fn into_transaction(self, id: usize) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            kind: self.kind,
            description: self.description,
            merchant_name: self.merchant_name,
            card_type: self.card_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record(date: &str) -> TransactionRecord {
        TransactionRecord {
            transaction_id: None,
            transaction_date: date.to_string(),
            transaction_amount: Amount::from_str("10.5").unwrap(),
            transaction_type: "debit".to_string(),
            transaction_description: "Groceries".to_string(),
            merchant_name: "SuperMart".to_string(),
            card_type: "Visa".to_string(),
        }
    }

    #[test]
    fn test_parse_valid_record() {
        let tx = record("2019-01-05").parse(1).unwrap();
        assert_eq!(tx.id, 1);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2019, 1, 5).unwrap());
        assert_eq!(tx.amount.to_string(), "10.5000");
        assert!(tx.is_debit());
        assert!(!tx.is_credit());
        assert_eq!(tx.date_key(), 20190105);
    }

    #[test]
    fn test_parse_rejects_malformed_date() {
        assert!(record("2019-13-05").parse(1).is_err());
        assert!(record("05/01/2019").parse(1).is_err());
        assert!(record("").parse(1).is_err());
    }

    #[test]
    fn test_type_comparison_is_case_sensitive() {
        let mut raw = record("2019-01-05");
        raw.transaction_type = "Debit".to_string();
        let tx = raw.parse(1).unwrap();
        assert!(!tx.is_debit());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{
            "transaction_date": "2019-03-01",
            "transaction_amount": 200,
            "transaction_type": "credit"
        }"#;

        let raw: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.transaction_id, None);
        assert_eq!(raw.merchant_name, "");

        let tx = raw.parse(7).unwrap();
        assert_eq!(tx.id, 7);
        assert!(tx.is_credit());
    }

    #[test]
    fn test_unusable_ids_and_null_text_are_tolerated() {
        let json = r#"[
            {"transaction_id": "4", "transaction_date": "2019-03-01", "transaction_amount": 1,
             "transaction_type": "debit", "merchant_name": null, "transaction_description": null},
            {"transaction_id": -2, "transaction_date": "2019-03-02", "transaction_amount": 1,
             "transaction_type": "debit", "card_type": null},
            {"transaction_id": 1.5, "transaction_date": "2019-03-03", "transaction_amount": 1,
             "transaction_type": "debit"},
            {"transaction_id": null, "transaction_date": "2019-03-04", "transaction_amount": 1,
             "transaction_type": "debit"}
        ]"#;

        let raw: Vec<TransactionRecord> = serde_json::from_str(json).unwrap();
        let ids: Vec<Option<usize>> = raw.iter().map(|r| r.transaction_id).collect();
        assert_eq!(ids, vec![Some(4), None, None, None]);
        assert_eq!(raw[0].merchant_name, "");
        assert_eq!(raw[0].transaction_description, "");
        assert_eq!(raw[1].card_type, "");
    }

    #[test]
    fn test_record_from_transaction_fills_id() {
        let tx = record("2019-01-05").parse(3).unwrap();
        let back = TransactionRecord::from(&tx);
        assert_eq!(back.transaction_id, Some(3));
        assert_eq!(back.transaction_date, "2019-01-05");
        assert_eq!(back.merchant_name, "SuperMart");
    }

    #[test]
    fn test_new_transaction_requires_valid_date() {
        let amount = Amount::from(5);
        assert!(matches!(
            NewTransaction::new("2020-02-30", amount, "debit", "x", "y", "z"),
            Err(AnalyzerError::InvalidDate(d)) if d == "2020-02-30"
        ));

        let new_tx = NewTransaction::new("2020-02-29", amount, "debit", "x", "y", "z").unwrap();
        let tx = new_tx.into_transaction(4);
        assert_eq!(tx.id, 4);
        assert_eq!(tx.card_type, "z");
    }
}
