//! Batch processing with transaction-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which processes batches
//! of command records concurrently while keeping the commands of each
//! transaction in their original order.
//!
//! # Design
//!
//! A batch is partitioned by transaction reference. Each partition becomes
//! one tokio task that applies its commands sequentially; partitions run in
//! parallel. Callers process batches one after another, which keeps the
//! per-transaction order across batch boundaries as well.
//!
//! ```text
//! BatchProcessor
//!     └── Arc<AsyncTransactionBook>  (shared, entry-locked per transaction)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::AsyncTransactionBook;
use crate::types::{CommandRecord, LedgerError, TransactionRef, TransactionState};

/// Result of processing a single command
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The command record that was processed
    pub record: CommandRecord,

    /// The resulting state, or the error that rejected the command
    pub result: Result<TransactionState, LedgerError>,
}

/// Batch processor with transaction-based partitioning
///
/// Cloneable; every clone shares the same book.
#[derive(Clone)]
pub struct BatchProcessor {
    book: Arc<AsyncTransactionBook>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor over a shared book
    pub fn new(book: Arc<AsyncTransactionBook>) -> Self {
        Self { book }
    }

    /// Partition a batch of commands by transaction reference
    ///
    /// # Guarantees
    ///
    /// - Each command appears in exactly one partition
    /// - Commands within a partition keep their original order
    pub fn partition_by_transaction(
        &self,
        batch: Vec<CommandRecord>,
    ) -> HashMap<TransactionRef, Vec<CommandRecord>> {
        let mut partitions: HashMap<TransactionRef, Vec<CommandRecord>> = HashMap::new();

        for record in batch {
            partitions.entry(record.tx).or_default().push(record);
        }

        partitions
    }

    /// Apply all commands of one transaction sequentially
    ///
    /// All commands are attempted even if some fail. Results keep the input
    /// order.
    pub async fn process_transaction_commands(
        &self,
        commands: Vec<CommandRecord>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(commands.len());

        for record in commands {
            let result = self.book.process_command(record.clone());
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Process a batch of commands with transaction-based partitioning
    ///
    /// 1. Partitions the batch by transaction reference
    /// 2. Spawns one tokio task per partition
    /// 3. Waits for all tasks and collects their results
    ///
    /// Results of different transactions may be interleaved in any order.
    pub async fn process_batch(&self, batch: Vec<CommandRecord>) -> Vec<ProcessingResult> {
        let partitions = self.partition_by_transaction(batch);

        let mut tasks = Vec::with_capacity(partitions.len());
        for (_tx, commands) in partitions {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_transaction_commands(commands).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(transaction_results) => results.extend(transaction_results),
                Err(e) => tracing::error!(error = %e, "batch task panicked"),
            }
        }

        results
    }
}
