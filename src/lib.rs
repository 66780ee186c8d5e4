//! Transaction Ledger Library
//! # Overview
//!
//! This library drives transactions through an approval lifecycle and keeps a
//! ledger of balance, credit and payments for each of them. Commands are read
//! from CSV with either a synchronous or an asynchronous batch strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (states, operations, commands, payments, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::transitions`] - The transition table
//!   - [`core::ledger`] - Balance, credit and payment bookkeeping
//!   - [`core::machine`] - The per-transaction state machine
//!   - [`core::audit`] - Audit logging
//!   - [`core::book`] - Registry of transactions keyed by reference
//! - [`io`] - CSV reading and report writing
//! - [`strategy`] - Complete processing pipelines
//! - [`logging`] - Tracing subscriber setup
//!
//! # Lifecycle
//!
//! ```text
//! Draft ──submit──▶ Submitted ──approve──▶ Approved ──activate──▶ Active ──settle──▶ Settled
//! ```
//!
//! `reject` moves Approved or Active to Rejected. `cancel` moves Active to
//! Cancelled. Settled, Rejected and Cancelled are terminal.
//!
//! # Ledger
//!
//! Each settlement records a payment. A payment no larger than the balance
//! reduces it; a larger payment zeroes the balance and adds the excess to
//! credit. Balance and credit never go negative.

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{AuditLog, TransactionBook, TransactionStateMachine};
pub use io::{write_payments_csv, write_summary_csv};
pub use types::{
    Command, CommandRecord, LedgerError, Operation, Payment, TransactionId, TransactionRef,
    TransactionState, TransactionSummary,
};
