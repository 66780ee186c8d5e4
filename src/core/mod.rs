//! Core business logic module
//!
//! This module contains the transaction lifecycle components:
//! - `transitions` - The transition table
//! - `ledger` - Balance, credit and payment-history bookkeeping
//! - `audit` - Audit log trait and implementations
//! - `machine` - The transaction state machine
//! - `book` - Single-threaded transaction registry
//! - `async` - Thread-safe registry and batch processing

pub mod r#async;
pub mod audit;
pub mod book;
pub mod ledger;
pub mod machine;
pub mod transitions;

pub use audit::{default_audit_log, AuditEntry, AuditLevel, AuditLog, MemoryAuditLog, TracingAuditLog};
pub use book::TransactionBook;
pub use ledger::{Ledger, LedgerStep};
pub use machine::TransactionStateMachine;
pub use r#async::{AsyncTransactionBook, BatchProcessor};
