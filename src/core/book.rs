//! Transaction book
//!
//! This module provides the `TransactionBook`, which keeps every transaction
//! opened during processing and routes command records to them.
//!
//! The book enforces the rules around transaction references:
//! - `open` registers a new transaction; a reference can only be opened once
//! - every other command requires a previously opened reference
//!
//! Lifecycle rules themselves belong to each `TransactionStateMachine`.

use crate::core::audit::{default_audit_log, AuditLog};
use crate::core::machine::TransactionStateMachine;
use crate::types::{
    Command, CommandRecord, LedgerError, Payment, TransactionRef, TransactionState,
    TransactionSummary,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of transactions keyed by caller reference
///
/// Single-threaded counterpart of
/// [`AsyncTransactionBook`](crate::core::r#async::AsyncTransactionBook).
pub struct TransactionBook {
    /// Map of transaction reference to state machine
    transactions: HashMap<TransactionRef, TransactionStateMachine>,

    /// Audit log handed to every machine the book opens
    audit: Arc<dyn AuditLog>,
}

impl TransactionBook {
    /// Create an empty book using the process-wide audit log
    pub fn new() -> Self {
        Self::with_audit_log(default_audit_log())
    }

    /// Create an empty book whose machines report to `audit`
    pub fn with_audit_log(audit: Arc<dyn AuditLog>) -> Self {
        TransactionBook {
            transactions: HashMap::new(),
            audit,
        }
    }

    /// Process a single command record
    ///
    /// # Returns
    ///
    /// * `Ok(TransactionState)` - The transaction's state after the command
    /// * `Err(LedgerError)` - If the command failed; nothing was changed
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `open` names a reference that is already registered
    /// - any other command names an unknown reference
    /// - the state machine rejects the command
    pub fn process(&mut self, record: CommandRecord) -> Result<TransactionState, LedgerError> {
        match record.command {
            Command::Open { initial_balance } => self.open(record.tx, initial_balance),
            command => {
                let machine = self
                    .transactions
                    .get_mut(&record.tx)
                    .ok_or_else(|| LedgerError::transaction_not_found(record.tx, command.name()))?;
                machine.apply(command)
            }
        }
    }

    /// Open a transaction in Draft under `tx`
    ///
    /// # Errors
    ///
    /// * `DuplicateTransaction` - If `tx` is already registered
    /// * `InvalidArgument` - If `initial_balance` is negative
    pub fn open(
        &mut self,
        tx: TransactionRef,
        initial_balance: Decimal,
    ) -> Result<TransactionState, LedgerError> {
        if self.transactions.contains_key(&tx) {
            return Err(LedgerError::duplicate_transaction(tx));
        }

        let machine =
            TransactionStateMachine::with_audit_log(initial_balance, Arc::clone(&self.audit))?;
        let state = machine.state();
        self.transactions.insert(tx, machine);

        Ok(state)
    }

    /// Look up a transaction by reference
    pub fn get(&self, tx: TransactionRef) -> Option<&TransactionStateMachine> {
        self.transactions.get(&tx)
    }

    /// Number of registered transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Summaries of all transactions, sorted by reference
    pub fn summaries(&self) -> Vec<TransactionSummary> {
        let mut summaries: Vec<TransactionSummary> = self
            .transactions
            .iter()
            .map(|(&tx, machine)| machine.summary(tx))
            .collect();
        summaries.sort_by_key(|summary| summary.tx);
        summaries
    }

    /// Every recorded payment tagged with its reference
    ///
    /// Ordered by reference, then by payment order within the transaction.
    pub fn payment_history(&self) -> Vec<(TransactionRef, Payment)> {
        let mut refs: Vec<TransactionRef> = self.transactions.keys().copied().collect();
        refs.sort_unstable();

        refs.into_iter()
            .flat_map(|tx| {
                self.transactions[&tx]
                    .payments()
                    .iter()
                    .cloned()
                    .map(move |payment| (tx, payment))
            })
            .collect()
    }
}

impl Default for TransactionBook {
    fn default() -> Self {
        Self::new()
    }
}
