//! Transaction identifiers, command records and report rows
//!
//! This module defines the identifiers used to name transactions, the
//! commands that drive a transaction book, and the summary row produced for
//! each transaction at the end of processing.

use super::state::{Operation, TransactionState};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Caller-chosen transaction reference
///
/// Names a transaction inside a book or an input file. Supports references
/// from 0 to 4,294,967,295.
pub type TransactionRef = u32;

/// Unique identifier assigned to a transaction at creation
pub type TransactionId = Uuid;

/// A lifecycle command with its arguments
///
/// `Open` creates a transaction; every other variant maps onto one
/// [`Operation`] of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a transaction in Draft with the given initial balance
    Open { initial_balance: Decimal },

    /// Draft → Submitted
    Submit,

    /// Submitted → Approved
    Approve,

    /// Approved → Active
    Activate,

    /// Apply a payment; Active → Settled once the balance is already zero
    Settle { amount: Decimal },

    /// Approved/Active → Rejected
    Reject { reason: String },

    /// Active → Cancelled
    Cancel { reason: String },
}

impl Command {
    /// The state machine operation this command performs
    ///
    /// Returns `None` for `Open`, which creates a transaction rather than
    /// operating on one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Command::Open { .. } => None,
            Command::Submit => Some(Operation::Submit),
            Command::Approve => Some(Operation::Approve),
            Command::Activate => Some(Operation::Activate),
            Command::Settle { .. } => Some(Operation::Settle),
            Command::Reject { .. } => Some(Operation::Reject),
            Command::Cancel { .. } => Some(Operation::Cancel),
        }
    }

    /// Lowercase command name, as used in CSV input
    pub fn name(&self) -> &'static str {
        self.operation().map_or("open", Operation::as_str)
    }
}

/// Input command record
///
/// Represents a single command as read from the input CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// Transaction the command applies to
    pub tx: TransactionRef,

    /// The command and its arguments
    pub command: Command,
}

/// Final state of one transaction, as written to the summary report
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSummary {
    /// Caller-chosen reference
    pub tx: TransactionRef,

    /// Identifier assigned at creation
    pub id: TransactionId,

    /// Current lifecycle phase
    pub state: TransactionState,

    /// Outstanding balance
    pub balance: Decimal,

    /// Accumulated credit
    pub credit: Decimal,

    /// Number of recorded payments
    pub payments: usize,

    /// Rejection or cancellation reason, if any
    pub reason: Option<String>,
}
