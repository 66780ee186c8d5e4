//! Ledger entries recorded by settlement

use super::state::TransactionState;
use super::transaction::TransactionId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// One settlement applied to a transaction's balance
///
/// Payments are created by the ledger and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    /// Unique payment identifier
    pub id: Uuid,

    /// Identifier of the transaction the payment was applied to
    pub transaction_id: TransactionId,

    /// Amount paid
    pub amount: Decimal,

    /// When the payment was recorded
    pub timestamp: DateTime<Utc>,

    /// State of the transaction at the moment the payment was recorded
    pub status: TransactionState,

    /// Outstanding balance after the payment
    pub balance_after: Decimal,

    /// Accumulated credit after the payment
    pub credit_after: Decimal,
}
