//! Lifecycle states and operations of a transaction
//!
//! This module defines the seven phases a transaction moves through and the
//! six operations that drive it between phases. The legal edges between
//! phases live in [`crate::core::transitions`].

use std::fmt;

/// Lifecycle phase of a transaction
///
/// `Settled`, `Rejected` and `Cancelled` are terminal: no operation leads
/// out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Freshly created, not yet submitted for review
    Draft,

    /// Submitted and awaiting approval
    Submitted,

    /// Approved, may be activated or rejected
    Approved,

    /// Live: accepts settlement payments, may be rejected or cancelled
    Active,

    /// Fully paid and closed
    Settled,

    /// Rejected during review or while active
    Rejected,

    /// Cancelled while active
    Cancelled,
}

impl TransactionState {
    /// All states in lifecycle order
    pub const ALL: [TransactionState; 7] = [
        TransactionState::Draft,
        TransactionState::Submitted,
        TransactionState::Approved,
        TransactionState::Active,
        TransactionState::Settled,
        TransactionState::Rejected,
        TransactionState::Cancelled,
    ];

    /// Whether the state has no outgoing transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionState::Settled | TransactionState::Rejected | TransactionState::Cancelled
        )
    }

    /// Display name of the state
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionState::Draft => "Draft",
            TransactionState::Submitted => "Submitted",
            TransactionState::Approved => "Approved",
            TransactionState::Active => "Active",
            TransactionState::Settled => "Settled",
            TransactionState::Rejected => "Rejected",
            TransactionState::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation a caller can attempt on a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Submit,
    Approve,
    Activate,
    Settle,
    Reject,
    Cancel,
}

impl Operation {
    /// All operations in lifecycle order
    pub const ALL: [Operation; 6] = [
        Operation::Submit,
        Operation::Approve,
        Operation::Activate,
        Operation::Settle,
        Operation::Reject,
        Operation::Cancel,
    ];

    /// Lowercase command name, as used in CSV input
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Submit => "submit",
            Operation::Approve => "approve",
            Operation::Activate => "activate",
            Operation::Settle => "settle",
            Operation::Reject => "reject",
            Operation::Cancel => "cancel",
        }
    }

    /// Past-tense verb used in audit lines and error messages
    pub fn past_tense(self) -> &'static str {
        match self {
            Operation::Submit => "Submitted",
            Operation::Approve => "Approved",
            Operation::Activate => "Activated",
            Operation::Settle => "Settled",
            Operation::Reject => "Rejected",
            Operation::Cancel => "Cancelled",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
