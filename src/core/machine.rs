//! Transaction state machine
//!
//! This module provides the `TransactionStateMachine`, which owns one
//! transaction's lifecycle phase and ledger and exposes the six lifecycle
//! operations. Every operation follows the same shape:
//!
//! 1. Validate arguments
//! 2. Look up the destination in the transition table
//! 3. Compute any ledger change
//! 4. Mutate state and ledger, then write the audit line
//!
//! Steps 1-3 may fail; step 4 cannot. A failed operation therefore leaves the
//! state, balance, credit and payment history exactly as they were.
//!
//! # Settlement
//!
//! `settle` both records a payment and may close the transaction. It closes
//! the transaction only when the balance was already zero *before* the call,
//! so a payment that clears the balance exactly leaves the transaction
//! Active until the next settlement.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::audit::{default_audit_log, AuditLog};
use crate::core::ledger::Ledger;
use crate::core::transitions::next_state;
use crate::types::{
    Command, LedgerError, Operation, Payment, TransactionId, TransactionRef, TransactionState,
    TransactionSummary,
};

/// One transaction: lifecycle phase, ledger and reasons
pub struct TransactionStateMachine {
    id: TransactionId,
    state: TransactionState,
    ledger: Ledger,
    rejection_reason: Option<String>,
    cancellation_reason: Option<String>,
    audit: Arc<dyn AuditLog>,
}

impl TransactionStateMachine {
    /// Create a transaction in Draft using the process-wide audit log
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `initial_balance` is negative.
    pub fn new(initial_balance: Decimal) -> Result<Self, LedgerError> {
        Self::with_audit_log(initial_balance, default_audit_log())
    }

    /// Create a transaction in Draft reporting to the given audit log
    pub fn with_audit_log(
        initial_balance: Decimal,
        audit: Arc<dyn AuditLog>,
    ) -> Result<Self, LedgerError> {
        let ledger = Ledger::new(initial_balance)?;
        let machine = TransactionStateMachine {
            id: Uuid::new_v4(),
            state: TransactionState::Draft,
            ledger,
            rejection_reason: None,
            cancellation_reason: None,
            audit,
        };

        machine.audit.info(&format!(
            "Transaction ID {}: {} State {}.",
            machine.id, machine.state, initial_balance
        ));

        Ok(machine)
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn balance(&self) -> Decimal {
        self.ledger.balance()
    }

    pub fn credit(&self) -> Decimal {
        self.ledger.credit()
    }

    pub fn initial_balance(&self) -> Decimal {
        self.ledger.initial_balance()
    }

    /// Payment history, oldest first
    pub fn payments(&self) -> &[Payment] {
        self.ledger.payments()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Draft → Submitted
    pub fn submit(&mut self) -> Result<TransactionState, LedgerError> {
        self.transition(Operation::Submit)
    }

    /// Submitted → Approved
    pub fn approve(&mut self) -> Result<TransactionState, LedgerError> {
        self.transition(Operation::Approve)
    }

    /// Approved → Active
    pub fn activate(&mut self) -> Result<TransactionState, LedgerError> {
        self.transition(Operation::Activate)
    }

    /// Apply a payment, closing the transaction if the balance was already zero
    ///
    /// # Arguments
    ///
    /// * `amount` - The payment amount (must be positive)
    ///
    /// # Returns
    ///
    /// The state after the call: `Settled` if the balance was zero before the
    /// payment, `Active` otherwise.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - If `amount` is not positive (checked in every state)
    /// * `InvalidStateTransition` - If the transaction is not Active
    /// * `ArithmeticOverflow` - If the credit would overflow
    pub fn settle(&mut self, amount: Decimal) -> Result<TransactionState, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_argument(format!(
                "settlement amount must be positive, got {}",
                amount
            )));
        }

        let settled = next_state(self.state, Operation::Settle)?;
        let step = self.ledger.step(amount)?;

        if step.balance_before().is_zero() {
            self.enter(Operation::Settle, settled);
        }

        let payment = self.ledger.commit(step, self.id, self.state);
        self.audit.debug(&format!(
            "Transaction ID {}: Payment {} of {} recorded. Balance {}, credit {}.",
            self.id, payment.id, payment.amount, payment.balance_after, payment.credit_after
        ));

        Ok(self.state)
    }

    /// Approved/Active → Rejected, recording the reason
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<TransactionState, LedgerError> {
        let rejected = next_state(self.state, Operation::Reject)?;
        self.rejection_reason = Some(reason.into());
        self.enter(Operation::Reject, rejected);
        Ok(self.state)
    }

    /// Active → Cancelled, recording the reason
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<TransactionState, LedgerError> {
        let cancelled = next_state(self.state, Operation::Cancel)?;
        self.cancellation_reason = Some(reason.into());
        self.enter(Operation::Cancel, cancelled);
        Ok(self.state)
    }

    /// Apply a lifecycle command to this transaction
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for `Command::Open`: an existing transaction
    /// cannot be opened again. Other errors are those of the operation.
    pub fn apply(&mut self, command: Command) -> Result<TransactionState, LedgerError> {
        match command {
            Command::Open { .. } => Err(LedgerError::invalid_argument(format!(
                "transaction {} is already open",
                self.id
            ))),
            Command::Submit => self.submit(),
            Command::Approve => self.approve(),
            Command::Activate => self.activate(),
            Command::Settle { amount } => self.settle(amount),
            Command::Reject { reason } => self.reject(reason),
            Command::Cancel { reason } => self.cancel(reason),
        }
    }

    /// Summary row for reports
    pub fn summary(&self, tx: TransactionRef) -> TransactionSummary {
        TransactionSummary {
            tx,
            id: self.id,
            state: self.state,
            balance: self.balance(),
            credit: self.credit(),
            payments: self.payments().len(),
            reason: self
                .rejection_reason
                .clone()
                .or_else(|| self.cancellation_reason.clone()),
        }
    }

    fn transition(&mut self, operation: Operation) -> Result<TransactionState, LedgerError> {
        let next = next_state(self.state, operation)?;
        self.enter(operation, next);
        Ok(self.state)
    }

    fn enter(&mut self, operation: Operation, next: TransactionState) {
        let previous = self.state;
        self.state = next;
        self.audit.info(&format!(
            "Transaction ID {}: Transaction {}. {} -> {}.",
            self.id,
            operation.past_tense(),
            previous,
            next
        ));
    }
}

impl fmt::Debug for TransactionStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionStateMachine")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("ledger", &self.ledger)
            .field("rejection_reason", &self.rejection_reason)
            .field("cancellation_reason", &self.cancellation_reason)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::{AuditLevel, MemoryAuditLog};
    use rstest::rstest;

    fn machine_with_log(initial: i64) -> (TransactionStateMachine, Arc<MemoryAuditLog>) {
        let log = Arc::new(MemoryAuditLog::new());
        let machine =
            TransactionStateMachine::with_audit_log(Decimal::from(initial), log.clone()).unwrap();
        (machine, log)
    }

    fn machine_in(state: TransactionState) -> TransactionStateMachine {
        let (mut machine, _) = machine_with_log(100);
        let path: &[Operation] = match state {
            TransactionState::Draft => &[],
            TransactionState::Submitted => &[Operation::Submit],
            TransactionState::Approved => &[Operation::Submit, Operation::Approve],
            TransactionState::Active => {
                &[Operation::Submit, Operation::Approve, Operation::Activate]
            }
            TransactionState::Settled => &[
                Operation::Submit,
                Operation::Approve,
                Operation::Activate,
                Operation::Settle,
                Operation::Settle,
            ],
            TransactionState::Rejected => {
                &[Operation::Submit, Operation::Approve, Operation::Reject]
            }
            TransactionState::Cancelled => &[
                Operation::Submit,
                Operation::Approve,
                Operation::Activate,
                Operation::Cancel,
            ],
        };

        for operation in path {
            match operation {
                Operation::Submit => machine.submit().unwrap(),
                Operation::Approve => machine.approve().unwrap(),
                Operation::Activate => machine.activate().unwrap(),
                Operation::Settle => machine.settle(Decimal::from(100)).unwrap(),
                Operation::Reject => machine.reject("test").unwrap(),
                Operation::Cancel => machine.cancel("test").unwrap(),
            };
        }

        assert_eq!(machine.state(), state);
        machine
    }

    #[test]
    fn test_new_machine_starts_in_draft() {
        let machine = TransactionStateMachine::new(Decimal::from(1_000_000)).unwrap();
        assert_eq!(machine.state(), TransactionState::Draft);
        assert_eq!(machine.balance(), Decimal::from(1_000_000));
        assert_eq!(machine.credit(), Decimal::ZERO);
        assert!(machine.payments().is_empty());
        assert_eq!(machine.rejection_reason(), None);
        assert_eq!(machine.cancellation_reason(), None);
    }

    #[test]
    fn test_new_machine_rejects_negative_balance() {
        let result = TransactionStateMachine::new(Decimal::from(-5));
        assert!(matches!(result, Err(LedgerError::InvalidArgument { .. })));
    }

    #[test]
    fn test_machines_get_distinct_ids() {
        let a = TransactionStateMachine::new(Decimal::ONE).unwrap();
        let b = TransactionStateMachine::new(Decimal::ONE).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_reference_settlement_scenario() {
        let (mut machine, _) = machine_with_log(1_000_000);
        let half = Decimal::from(500_000);

        assert_eq!(machine.submit(), Ok(TransactionState::Submitted));
        assert_eq!(machine.approve(), Ok(TransactionState::Approved));
        assert_eq!(machine.activate(), Ok(TransactionState::Active));

        assert_eq!(machine.settle(half), Ok(TransactionState::Active));
        assert_eq!(machine.balance(), half);
        assert_eq!(machine.credit(), Decimal::ZERO);
        assert_eq!(machine.payments().len(), 1);

        // Clearing the balance exactly does not close the transaction
        assert_eq!(machine.settle(half), Ok(TransactionState::Active));
        assert_eq!(machine.balance(), Decimal::ZERO);
        assert_eq!(machine.credit(), Decimal::ZERO);
        assert_eq!(machine.payments().len(), 2);

        assert_eq!(machine.settle(half), Ok(TransactionState::Settled));
        assert_eq!(machine.balance(), Decimal::ZERO);
        assert_eq!(machine.credit(), half);
        assert_eq!(machine.payments().len(), 3);

        let statuses: Vec<_> = machine.payments().iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                TransactionState::Active,
                TransactionState::Active,
                TransactionState::Settled
            ]
        );
        assert!(machine.payments().iter().all(|p| p.transaction_id == machine.id()));
        assert!(machine.ledger().is_consistent());
    }

    #[test]
    fn test_approve_in_draft_fails_and_keeps_state() {
        let (mut machine, _) = machine_with_log(100);

        let result = machine.approve();

        assert_eq!(
            result,
            Err(LedgerError::InvalidStateTransition {
                operation: Operation::Approve,
                state: TransactionState::Draft,
            })
        );
        assert_eq!(machine.state(), TransactionState::Draft);
    }

    #[rstest]
    fn test_negative_settlement_fails_in_every_state(
        #[values(
            TransactionState::Draft,
            TransactionState::Submitted,
            TransactionState::Approved,
            TransactionState::Active,
            TransactionState::Settled,
            TransactionState::Rejected,
            TransactionState::Cancelled
        )]
        state: TransactionState,
        #[values(Decimal::from(-10), Decimal::ZERO)] amount: Decimal,
    ) {
        let mut machine = machine_in(state);
        let payments_before = machine.payments().len();

        let result = machine.settle(amount);

        assert!(matches!(result, Err(LedgerError::InvalidArgument { .. })));
        assert_eq!(machine.state(), state);
        assert_eq!(machine.payments().len(), payments_before);
    }

    #[rstest]
    #[case(TransactionState::Draft)]
    #[case(TransactionState::Submitted)]
    #[case(TransactionState::Approved)]
    #[case(TransactionState::Settled)]
    #[case(TransactionState::Rejected)]
    #[case(TransactionState::Cancelled)]
    fn test_settle_outside_active_records_nothing(#[case] state: TransactionState) {
        let mut machine = machine_in(state);
        let balance = machine.balance();
        let credit = machine.credit();
        let payments = machine.payments().len();

        let result = machine.settle(Decimal::from(10));

        assert_eq!(
            result,
            Err(LedgerError::invalid_state_transition(Operation::Settle, state))
        );
        assert_eq!(machine.state(), state);
        assert_eq!(machine.balance(), balance);
        assert_eq!(machine.credit(), credit);
        assert_eq!(machine.payments().len(), payments);
    }

    #[rstest]
    #[case::from_approved(TransactionState::Approved)]
    #[case::from_active(TransactionState::Active)]
    fn test_reject_records_reason(#[case] state: TransactionState) {
        let mut machine = machine_in(state);

        assert_eq!(
            machine.reject("documents missing"),
            Ok(TransactionState::Rejected)
        );
        assert_eq!(machine.rejection_reason(), Some("documents missing"));
        assert_eq!(machine.cancellation_reason(), None);
    }

    #[rstest]
    #[case(TransactionState::Draft)]
    #[case(TransactionState::Submitted)]
    #[case(TransactionState::Settled)]
    #[case(TransactionState::Cancelled)]
    fn test_failed_reject_stores_no_reason(#[case] state: TransactionState) {
        let mut machine = machine_in(state);

        assert!(machine.reject("late").is_err());
        assert_eq!(machine.rejection_reason(), None);
        assert_eq!(machine.state(), state);
    }

    #[test]
    fn test_cancel_from_active_records_reason() {
        let mut machine = machine_in(TransactionState::Active);

        assert_eq!(
            machine.cancel("customer request"),
            Ok(TransactionState::Cancelled)
        );
        assert_eq!(machine.cancellation_reason(), Some("customer request"));
        assert_eq!(
            machine.summary(1).reason.as_deref(),
            Some("customer request")
        );
    }

    #[test]
    fn test_cancel_from_approved_fails() {
        let mut machine = machine_in(TransactionState::Approved);

        assert_eq!(
            machine.cancel("too early"),
            Err(LedgerError::invalid_state_transition(
                Operation::Cancel,
                TransactionState::Approved
            ))
        );
        assert_eq!(machine.cancellation_reason(), None);
    }

    #[rstest]
    fn test_terminal_states_accept_nothing(
        #[values(
            TransactionState::Settled,
            TransactionState::Rejected,
            TransactionState::Cancelled
        )]
        state: TransactionState,
    ) {
        let mut machine = machine_in(state);

        assert!(machine.submit().is_err());
        assert!(machine.approve().is_err());
        assert!(machine.activate().is_err());
        assert!(machine.settle(Decimal::ONE).is_err());
        assert!(machine.reject("again").is_err());
        assert!(machine.cancel("again").is_err());
        assert_eq!(machine.state(), state);
    }

    #[test]
    fn test_transitions_are_audited() {
        let (mut machine, log) = machine_with_log(100);
        let id = machine.id();

        machine.submit().unwrap();
        machine.approve().unwrap();
        let _ = machine.activate();
        let _ = machine.activate();

        let info = log.messages(AuditLevel::Info);
        assert_eq!(info.len(), 4);
        assert_eq!(info[0], format!("Transaction ID {}: Draft State 100.", id));
        assert_eq!(
            info[1],
            format!("Transaction ID {}: Transaction Submitted. Draft -> Submitted.", id)
        );
        assert_eq!(
            info[3],
            format!("Transaction ID {}: Transaction Activated. Approved -> Active.", id)
        );
    }

    #[rstest]
    #[case::settled(Operation::Settle, "Transaction Settled. Active -> Settled.")]
    #[case::rejected(Operation::Reject, "Transaction Rejected. Active -> Rejected.")]
    #[case::cancelled(Operation::Cancel, "Transaction Cancelled. Active -> Cancelled.")]
    fn test_terminal_transitions_are_audited(
        #[case] operation: Operation,
        #[case] expected: &str,
    ) {
        let (mut machine, log) = machine_with_log(0);
        machine.submit().unwrap();
        machine.approve().unwrap();
        machine.activate().unwrap();

        match operation {
            Operation::Settle => machine.settle(Decimal::from(5)),
            Operation::Reject => machine.reject("fraud"),
            _ => machine.cancel("customer request"),
        }
        .unwrap();

        let info = log.messages(AuditLevel::Info);
        assert_eq!(info.len(), 5);
        assert_eq!(
            info[4],
            format!("Transaction ID {}: {}", machine.id(), expected)
        );
    }

    #[test]
    fn test_settlement_is_logged_at_debug() {
        let (mut machine, log) = machine_with_log(100);
        machine.submit().unwrap();
        machine.approve().unwrap();
        machine.activate().unwrap();
        machine.settle(Decimal::from(40)).unwrap();

        let debug = log.messages(AuditLevel::Debug);
        assert_eq!(debug.len(), 1);
        assert!(debug[0].contains("Balance 60, credit 0"));
    }

    #[test]
    fn test_apply_dispatches_commands() {
        let (mut machine, _) = machine_with_log(10);

        machine.apply(Command::Submit).unwrap();
        machine.apply(Command::Approve).unwrap();
        machine.apply(Command::Activate).unwrap();
        machine
            .apply(Command::Settle {
                amount: Decimal::from(4),
            })
            .unwrap();
        let state = machine
            .apply(Command::Reject {
                reason: "fraud".to_string(),
            })
            .unwrap();

        assert_eq!(state, TransactionState::Rejected);
        assert_eq!(machine.balance(), Decimal::from(6));
        assert_eq!(machine.rejection_reason(), Some("fraud"));
    }

    #[test]
    fn test_apply_open_is_rejected() {
        let (mut machine, _) = machine_with_log(10);

        let result = machine.apply(Command::Open {
            initial_balance: Decimal::ONE,
        });

        assert!(matches!(result, Err(LedgerError::InvalidArgument { .. })));
        assert_eq!(machine.balance(), Decimal::from(10));
    }
}
