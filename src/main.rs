//! Transaction Analyzer CLI
//!
//! Loads a transaction file and prints a summary of its aggregates.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use std::env;
use std::io;
use std::process;
use transaction_analyzer::{AnalyzerError, Result, SourceFormat, TransactionAnalyzer};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(AnalyzerError::MissingArgument);
    }

    let input_path = std::path::Path::new(&args[1]);
    SourceFormat::from_path(input_path)?;

    let analyzer = TransactionAnalyzer::open(input_path);

    let stdout = io::stdout();
    let handle = stdout.lock();
    analyzer.write_summary(handle)?;

    Ok(())
}
