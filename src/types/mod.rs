//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `state`: Lifecycle states and operations
//! - `transaction`: Identifiers, commands and summary rows
//! - `payment`: Ledger entries
//! - `error`: Error types for the transaction ledger

pub mod error;
pub mod payment;
pub mod state;
pub mod transaction;

pub use error::LedgerError;
pub use payment::Payment;
pub use state::{Operation, TransactionState};
pub use transaction::{Command, CommandRecord, TransactionId, TransactionRef, TransactionSummary};
