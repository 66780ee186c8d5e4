//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over command records from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! ```no_run
//! use transaction_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("commands.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Processing command: {:?}", record),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record errors are yielded as Err variants in the iterator,
//!   carrying the line number of the offending row

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{CommandRecord, LedgerError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one record at a time into a reused buffer; memory use does not
/// grow with file size.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    headers: StringRecord,
    record: StringRecord,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing columns are optional)
    /// - Use an 8KB buffer
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file could not be opened, or `ParseError` if
    /// the header row cannot be read.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);
        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
        })
    }

    fn convert_current(&self) -> Result<CommandRecord, LedgerError> {
        // Line where the record starts, so quoted newlines do not shift it
        let line = self.record.position().map(|pos| pos.line());

        let csv_record: CsvRecord =
            self.record
                .deserialize(Some(&self.headers))
                .map_err(|e| LedgerError::ParseError {
                    line,
                    message: e.to_string(),
                })?;

        convert_csv_record(csv_record).map_err(|e| match e {
            LedgerError::ParseError {
                line: None,
                message,
            } => LedgerError::ParseError { line, message },
            other => other,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<CommandRecord, LedgerError>;

    /// Get the next command record from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(CommandRecord))` - Successfully parsed record
    /// * `Some(Err(LedgerError))` - Parse or conversion error
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(self.convert_current()),
            Ok(false) => None,
            Err(e) => Some(Err(LedgerError::from(e))),
        }
    }
}
