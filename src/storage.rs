//! Reading and writing transaction sources.
//!
//! JSON sources are a top-level array of records; CSV sources carry the same
//! field names in a header row. Both are loaded whole, then validated record
//! by record.

use crate::error::{AnalyzerError, Result};
use crate::transaction::{Transaction, TransactionRecord};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// On-disk representation of a transaction collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Infers the format from a `.json` or `.csv` extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Ok(SourceFormat::Json),
            Some("csv") => Ok(SourceFormat::Csv),
            _ => Err(AnalyzerError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Deserializes raw records without validating them.
pub fn read_records<R: Read>(reader: R, format: SourceFormat) -> Result<Vec<TransactionRecord>> {
    match format {
        SourceFormat::Json => Ok(serde_json::from_reader(reader)?),
        SourceFormat::Csv => {
            let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
            let mut records = Vec::new();
            for result in csv_reader.deserialize::<TransactionRecord>() {
                records.push(result?);
            }
            Ok(records)
        }
    }
}

/// Validates raw records into transactions with positional ids.
///
/// The first invalid record fails the whole batch.
pub fn parse_records(records: Vec<TransactionRecord>) -> Result<Vec<Transaction>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let position = index + 1;
            if let Some(explicit) = record.transaction_id.filter(|id| *id != position) {
                warn!(
                    "Record {}: transaction_id {} ignored, ids follow load position",
                    position, explicit
                );
            }
            record
                .parse(position)
                .map_err(|message| AnalyzerError::InvalidRecord {
                    row: position,
                    message,
                })
        })
        .collect()
}

/// Reads and validates transactions from any reader.
pub fn load<R: Read>(reader: R, format: SourceFormat) -> Result<Vec<Transaction>> {
    let records = read_records(reader, format)?;
    debug!("Read {} raw {:?} records", records.len(), format);
    parse_records(records)
}

/// Reads and validates transactions from a `.json` or `.csv` file.
pub fn load_path(path: &Path) -> Result<Vec<Transaction>> {
    let format = SourceFormat::from_path(path)?;
    let file = File::open(path)?;
    load(BufReader::new(file), format)
}

/// Serializes transactions back into their external representation.
pub fn write_records<W: Write>(
    writer: W,
    transactions: &[Transaction],
    format: SourceFormat,
) -> Result<()> {
    let records: Vec<TransactionRecord> = transactions.iter().map(TransactionRecord::from).collect();

    match format {
        SourceFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &records)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        SourceFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for record in &records {
                csv_writer.serialize(record)?;
            }
            csv_writer.flush()?;
        }
    }

    Ok(())
}

/// Writes transactions to a `.json` or `.csv` file, replacing its contents.
pub fn save_path(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let format = SourceFormat::from_path(path)?;
    let file = File::create(path)?;
    write_records(BufWriter::new(file), transactions, format)
}
