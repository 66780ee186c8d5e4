//! Synchronous processing strategy
//!
//! A single-threaded implementation of the ProcessingStrategy trait. It
//! orchestrates processing, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Command processing to `TransactionBook`
//! - Report output to the `csv_format` writers
//!
//! Records are processed one at a time; memory use is proportional to the
//! number of transactions and payments, not to the size of the input.

use super::ReportSource;
use crate::cli::ReportType;
use crate::core::TransactionBook;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use transaction_ledger::cli::ReportType;
/// use transaction_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(ReportType::Summary);
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("commands.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy {
    report: ReportType,
}

impl SyncProcessingStrategy {
    pub fn new(report: ReportType) -> Self {
        Self { report }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process commands from input file and write the report to output
    ///
    /// 1. Streams command records from the CSV file with a SyncReader
    /// 2. Applies each record to a TransactionBook
    /// 3. Writes the selected report
    ///
    /// Fatal errors are returned immediately. Individual record errors are
    /// logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let mut book = TransactionBook::new();

        let reader = SyncReader::new(input_path).map_err(|e| e.to_string())?;

        for result in reader {
            match result {
                Ok(record) => {
                    let tx = record.tx;
                    let command = record.command.name();
                    if let Err(e) = book.process(record) {
                        tracing::warn!(tx, command, error = %e, "command rejected");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed record");
                }
            }
        }

        tracing::debug!(transactions = book.len(), "input processed");

        book.write_report(self.report, output)
    }
}
