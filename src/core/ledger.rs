//! Balance, credit and payment-history bookkeeping
//!
//! The `Ledger` is embedded in every transaction state machine. Its only
//! mutation path is a settlement, split into two phases so the caller can
//! validate everything before touching any state:
//!
//! 1. [`Ledger::step`] computes the outcome of a payment without mutating
//!    anything and fails on invalid amounts or overflow.
//! 2. `Ledger::commit` applies a computed step and appends the payment. Only
//!    the owning state machine commits.
//!
//! # Settlement rule
//!
//! - If `amount < balance`: `balance -= amount`
//! - Otherwise: `credit += amount - balance` and `balance = 0`
//!
//! Consequently `credit` only grows once the balance has been cleared, and
//! both values stay non-negative.

use crate::types::{LedgerError, Payment, TransactionId, TransactionState};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Outcome of applying one payment, computed but not yet committed
///
/// Only [`Ledger::step`] creates steps, and only the owning state machine
/// commits them, so a ledger cannot be moved by a hand-built step:
///
/// ```compile_fail
/// use rust_decimal::Decimal;
/// use transaction_ledger::core::LedgerStep;
///
/// let forged = LedgerStep {
///     amount: Decimal::from(-5),
///     balance_before: Decimal::from(100),
///     balance_after: Decimal::from(-50),
///     credit_after: Decimal::from(-1),
/// };
/// ```
///
/// ```compile_fail
/// use rust_decimal::Decimal;
/// use transaction_ledger::core::Ledger;
/// use transaction_ledger::TransactionState;
///
/// let mut ledger = Ledger::new(Decimal::from(100)).unwrap();
/// let step = ledger.step(Decimal::from(30)).unwrap();
/// ledger.commit(step, uuid::Uuid::nil(), TransactionState::Draft);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStep {
    amount: Decimal,
    balance_before: Decimal,
    balance_after: Decimal,
    credit_after: Decimal,
}

impl LedgerStep {
    /// The payment amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Balance before the payment
    pub fn balance_before(&self) -> Decimal {
        self.balance_before
    }

    /// Balance after the payment
    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }

    /// Credit after the payment
    pub fn credit_after(&self) -> Decimal {
        self.credit_after
    }
}

/// Balance, credit and ordered payment history of one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    initial_balance: Decimal,
    balance: Decimal,
    credit: Decimal,
    payments: Vec<Payment>,
}

impl Ledger {
    /// Create a ledger with the given opening balance and no payments
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `initial_balance` is negative.
    pub fn new(initial_balance: Decimal) -> Result<Self, LedgerError> {
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_argument(format!(
                "initial balance must not be negative, got {}",
                initial_balance
            )));
        }

        Ok(Ledger {
            initial_balance,
            balance: initial_balance,
            credit: Decimal::ZERO,
            payments: Vec::new(),
        })
    }

    /// The balance the ledger was opened with
    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    /// Outstanding balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Amount paid in excess of the balance
    pub fn credit(&self) -> Decimal {
        self.credit
    }

    /// Payment history, oldest first
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Compute the effect of a payment without applying it
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - If `amount` is zero or negative
    /// * `ArithmeticOverflow` - If the credit would overflow
    pub fn step(&self, amount: Decimal) -> Result<LedgerStep, LedgerError> {
        let (balance_after, credit_after) = apply_payment(self.balance, self.credit, amount)?;

        Ok(LedgerStep {
            amount,
            balance_before: self.balance,
            balance_after,
            credit_after,
        })
    }

    /// Apply a step computed by [`Ledger::step`] and append its payment
    ///
    /// `status` is recorded on the payment as the transaction's state at the
    /// moment of payment.
    pub(crate) fn commit(
        &mut self,
        step: LedgerStep,
        transaction_id: TransactionId,
        status: TransactionState,
    ) -> &Payment {
        debug_assert_eq!(step.balance_before, self.balance);

        self.balance = step.balance_after;
        self.credit = step.credit_after;
        self.payments.push(Payment {
            id: Uuid::new_v4(),
            transaction_id,
            amount: step.amount,
            timestamp: Utc::now(),
            status,
            balance_after: step.balance_after,
            credit_after: step.credit_after,
        });

        &self.payments[self.payments.len() - 1]
    }

    /// Recompute balance and credit by replaying a payment history
    ///
    /// # Arguments
    ///
    /// * `initial_balance` - Opening balance
    /// * `payments` - Payments in the order they were recorded
    ///
    /// # Returns
    ///
    /// The `(balance, credit)` pair the history leads to.
    pub fn replay(
        initial_balance: Decimal,
        payments: &[Payment],
    ) -> Result<(Decimal, Decimal), LedgerError> {
        payments.iter().try_fold(
            (initial_balance, Decimal::ZERO),
            |(balance, credit), payment| apply_payment(balance, credit, payment.amount),
        )
    }

    /// Whether replaying the payment history reproduces the stored values
    ///
    /// Also checks that each payment's `balance_after`/`credit_after`
    /// matches the running replay.
    pub fn is_consistent(&self) -> bool {
        let mut balance = self.initial_balance;
        let mut credit = Decimal::ZERO;

        for payment in &self.payments {
            match apply_payment(balance, credit, payment.amount) {
                Ok((next_balance, next_credit)) => {
                    if next_balance != payment.balance_after || next_credit != payment.credit_after
                    {
                        return false;
                    }
                    balance = next_balance;
                    credit = next_credit;
                }
                Err(_) => return false,
            }
        }

        balance == self.balance && credit == self.credit
    }
}

/// Apply the settlement rule to a `(balance, credit)` pair
fn apply_payment(
    balance: Decimal,
    credit: Decimal,
    amount: Decimal,
) -> Result<(Decimal, Decimal), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_argument(format!(
            "settlement amount must be positive, got {}",
            amount
        )));
    }

    if amount < balance {
        let balance = balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("settle"))?;
        return Ok((balance, credit));
    }

    let excess = amount
        .checked_sub(balance)
        .ok_or_else(|| LedgerError::arithmetic_overflow("settle"))?;
    let credit = credit
        .checked_add(excess)
        .ok_or_else(|| LedgerError::arithmetic_overflow("settle"))?;

    Ok((Decimal::ZERO, credit))
}
