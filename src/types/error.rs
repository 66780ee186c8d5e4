//! Error types for the transaction ledger
//!
//! This module defines all error types that can occur while driving
//! transactions through their lifecycle.
//!
//! # Error Categories
//!
//! - **Lifecycle Errors**: An operation attempted from a state that does not permit it
//! - **Argument Errors**: Non-positive settlements, negative opening balances, etc.
//! - **Book Errors**: Unknown or duplicate transaction references
//! - **Input Errors**: Malformed CSV, missing amounts, I/O failures
//! - **Arithmetic Errors**: Overflow in balance calculations
//!
//! Every error is returned before any mutation happens, so a failed call
//! leaves the transaction exactly as it was.

use super::state::{Operation, TransactionState};
use super::transaction::TransactionRef;
use thiserror::Error;

/// Main error type for the transaction ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Operation attempted from a state that does not permit it
    ///
    /// The transaction state is left unchanged.
    #[error("Transaction cannot be {}. Transaction is currently {state}", operation.past_tense())]
    InvalidStateTransition {
        /// The attempted operation
        operation: Operation,
        /// The state the transaction was in
        state: TransactionState,
    },

    /// Malformed input to an operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem
        message: String,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// No transaction is registered under the reference
    #[error("Transaction {tx} not found for {operation}")]
    TransactionNotFound {
        /// Transaction reference that was not found
        tx: TransactionRef,
        /// Command that failed
        operation: String,
    },

    /// A transaction is already registered under the reference
    #[error("Duplicate transaction reference {tx}")]
    DuplicateTransaction {
        /// Transaction reference that is duplicated
        tx: TransactionRef,
    },

    /// Amount field is missing for a command that requires it
    #[error("{command} command for transaction {tx} requires an amount")]
    MissingAmount {
        /// Command that requires an amount
        command: String,
        /// Transaction reference
        tx: TransactionRef,
    },

    /// CSV parsing error occurred
    ///
    /// The malformed record is skipped and processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidStateTransition error
    pub fn invalid_state_transition(operation: Operation, state: TransactionState) -> Self {
        LedgerError::InvalidStateTransition { operation, state }
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        LedgerError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(tx: TransactionRef, operation: &str) -> Self {
        LedgerError::TransactionNotFound {
            tx,
            operation: operation.to_string(),
        }
    }

    /// Create a DuplicateTransaction error
    pub fn duplicate_transaction(tx: TransactionRef) -> Self {
        LedgerError::DuplicateTransaction { tx }
    }

    /// Create a MissingAmount error
    pub fn missing_amount(command: &str, tx: TransactionRef) -> Self {
        LedgerError::MissingAmount {
            command: command.to_string(),
            tx,
        }
    }
}
