//! Thread-safe transaction book for async batch processing
//!
//! This module provides the `AsyncTransactionBook` struct, which manages
//! transaction state machines using concurrent data structures to enable
//! safe multi-threaded access.
//!
//! # Design
//!
//! The book stores machines in a `DashMap`. Every command holds the map
//! entry of its transaction for the whole "read state, validate, mutate,
//! append payment" sequence, so that sequence is a critical section per
//! transaction. Commands on different transactions proceed in parallel.

use crate::core::audit::{default_audit_log, AuditLog};
use crate::core::machine::TransactionStateMachine;
use crate::types::{
    Command, CommandRecord, LedgerError, Payment, TransactionRef, TransactionState,
    TransactionSummary,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Thread-safe registry of transactions keyed by caller reference
///
/// All methods take `&self` and are safe to call from multiple threads
/// concurrently. Operations on the same transaction are serialized by the
/// map entry lock.
pub struct AsyncTransactionBook {
    /// Concurrent map of transaction reference to state machine
    transactions: DashMap<TransactionRef, TransactionStateMachine>,

    /// Audit log handed to every machine the book opens
    audit: Arc<dyn AuditLog>,
}

impl AsyncTransactionBook {
    /// Create an empty book using the process-wide audit log
    pub fn new() -> Self {
        Self::with_audit_log(default_audit_log())
    }

    /// Create an empty book whose machines report to `audit`
    pub fn with_audit_log(audit: Arc<dyn AuditLog>) -> Self {
        Self {
            transactions: DashMap::new(),
            audit,
        }
    }

    /// Process a single command record
    ///
    /// The command runs while holding the entry of its transaction, so no
    /// other thread can observe or modify that transaction mid-command.
    ///
    /// # Errors
    ///
    /// Same as [`TransactionBook::process`](crate::core::TransactionBook::process).
    pub fn process_command(&self, record: CommandRecord) -> Result<TransactionState, LedgerError> {
        match record.command {
            Command::Open { initial_balance } => self.open(record.tx, initial_balance),
            command => {
                let mut entry = self
                    .transactions
                    .get_mut(&record.tx)
                    .ok_or_else(|| LedgerError::transaction_not_found(record.tx, command.name()))?;
                entry.value_mut().apply(command)
            }
        }
    }

    /// Open a transaction in Draft under `tx`
    ///
    /// The duplicate check and the insertion happen under one entry lock.
    pub fn open(
        &self,
        tx: TransactionRef,
        initial_balance: Decimal,
    ) -> Result<TransactionState, LedgerError> {
        match self.transactions.entry(tx) {
            Entry::Occupied(_) => Err(LedgerError::duplicate_transaction(tx)),
            Entry::Vacant(vacant) => {
                let machine = TransactionStateMachine::with_audit_log(
                    initial_balance,
                    Arc::clone(&self.audit),
                )?;
                let state = machine.state();
                vacant.insert(machine);
                Ok(state)
            }
        }
    }

    /// Summary of one transaction, if registered
    pub fn summary(&self, tx: TransactionRef) -> Option<TransactionSummary> {
        self.transactions
            .get(&tx)
            .map(|entry| entry.value().summary(tx))
    }

    /// Number of registered transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Summaries of all transactions, sorted by reference
    ///
    /// A snapshot: transactions may change after this method returns.
    pub fn summaries(&self) -> Vec<TransactionSummary> {
        let mut summaries: Vec<TransactionSummary> = self
            .transactions
            .iter()
            .map(|entry| entry.value().summary(*entry.key()))
            .collect();
        summaries.sort_by_key(|summary| summary.tx);
        summaries
    }

    /// Every recorded payment tagged with its reference
    ///
    /// Ordered by reference, then by payment order within the transaction.
    pub fn payment_history(&self) -> Vec<(TransactionRef, Payment)> {
        let mut history: Vec<(TransactionRef, Vec<Payment>)> = self
            .transactions
            .iter()
            .map(|entry| (*entry.key(), entry.value().payments().to_vec()))
            .collect();
        history.sort_by_key(|(tx, _)| *tx);

        history
            .into_iter()
            .flat_map(|(tx, payments)| payments.into_iter().map(move |payment| (tx, payment)))
            .collect()
    }
}

impl Default for AsyncTransactionBook {
    fn default() -> Self {
        Self::new()
    }
}
