//! Processing strategy module
//!
//! This module defines the complete processing pipelines, from CSV parsing
//! through the transaction book to report output. Different implementations
//! (synchronous, asynchronous batch) can be selected at runtime.

use crate::cli::{ReportType, StrategyType};
use crate::core::r#async::AsyncTransactionBook;
use crate::core::TransactionBook;
use crate::io::csv_format::{write_payments_csv, write_summary_csv};
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete command-processing pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Process commands from the input file and write the report to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing command records
    /// * `output` - Writer receiving the report
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - A fatal I/O error occurs during reading or writing
    /// - Output cannot be written
    ///
    /// Individual command errors are logged and do not cause this method to
    /// return an error. Processing continues with the next command.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `report` - Which report the strategy writes
/// * `config` - Optional configuration for async batch processing (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    report: ReportType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(report)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, report))
        }
    }
}

/// Source of report rows, implemented by both transaction books
trait ReportSource {
    fn write_report(&self, report: ReportType, output: &mut dyn Write) -> Result<(), String>;
}

impl ReportSource for TransactionBook {
    fn write_report(&self, report: ReportType, output: &mut dyn Write) -> Result<(), String> {
        match report {
            ReportType::Summary => write_summary_csv(&self.summaries(), output),
            ReportType::Payments => write_payments_csv(&self.payment_history(), output),
        }
    }
}

impl ReportSource for AsyncTransactionBook {
    fn write_report(&self, report: ReportType, output: &mut dyn Write) -> Result<(), String> {
        match report {
            ReportType::Summary => write_summary_csv(&self.summaries(), output),
            ReportType::Payments => write_payments_csv(&self.payment_history(), output),
        }
    }
}
