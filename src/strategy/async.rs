//! Asynchronous batch processing strategy
//!
//! A multi-threaded implementation of the ProcessingStrategy trait. Commands
//! are read in batches and each batch is partitioned by transaction reference
//! for parallel processing.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (transaction partitioning + tokio tasks)
//!     └── AsyncTransactionBook (DashMap-backed, one lock per transaction)
//! ```
//!
//! Batches are processed one after another, so the commands of a transaction
//! keep their input order even when they span several batches.

use super::ReportSource;
use crate::cli::ReportType;
use crate::core::r#async::{AsyncTransactionBook, BatchProcessor};
use crate::io::async_reader::AsyncReader;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
///
/// Controls how commands are batched and the number of worker threads
/// used within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid concurrency, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Send + Sync; all shared state lives in an Arc-wrapped
/// AsyncTransactionBook.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    report: ReportType,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `report` - Which report to write once the input is processed
    pub fn new(config: BatchConfig, report: ReportType) -> Self {
        Self { config, report }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process commands from input file and write the report to output
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Reads commands in batches with AsyncReader
    /// 3. Processes each batch to completion before reading the next
    /// 4. Writes the selected report
    ///
    /// Fatal errors (file not found, runtime errors) are returned
    /// immediately. Rejected commands are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let book = Arc::new(AsyncTransactionBook::new());
            let processor = BatchProcessor::new(Arc::clone(&book));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // csv-async reads futures::io::AsyncRead
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for processed in processor.process_batch(batch).await {
                    if let Err(e) = processed.result {
                        tracing::warn!(
                            tx = processed.record.tx,
                            command = processed.record.command.name(),
                            error = %e,
                            "command rejected"
                        );
                    }
                }
            }

            tracing::debug!(transactions = book.len(), "input processed");

            book.write_report(self.report, output)
        })
    }
}
