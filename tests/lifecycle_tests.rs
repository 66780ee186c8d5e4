//! Exhaustive lifecycle tests
//!
//! Every sequence of up to five operations drawn from a fixed alphabet is
//! applied to a fresh transaction, and the ledger invariants are checked after
//! each step.

use rstest::rstest;
use rust_decimal::Decimal;
use std::sync::Arc;
use transaction_ledger::core::ledger::Ledger;
use transaction_ledger::core::transitions::next_state;
use transaction_ledger::core::{MemoryAuditLog, TransactionStateMachine};
use transaction_ledger::{LedgerError, Operation, TransactionState};

#[derive(Debug, Clone, Copy)]
enum Step {
    Submit,
    Approve,
    Activate,
    Settle(i64),
    Reject,
    Cancel,
}

const ALPHABET: [Step; 8] = [
    Step::Submit,
    Step::Approve,
    Step::Activate,
    Step::Settle(40),
    Step::Settle(250),
    Step::Settle(-1),
    Step::Reject,
    Step::Cancel,
];

impl Step {
    fn operation(self) -> Operation {
        match self {
            Step::Submit => Operation::Submit,
            Step::Approve => Operation::Approve,
            Step::Activate => Operation::Activate,
            Step::Settle(_) => Operation::Settle,
            Step::Reject => Operation::Reject,
            Step::Cancel => Operation::Cancel,
        }
    }

    fn apply(
        self,
        machine: &mut TransactionStateMachine,
    ) -> Result<TransactionState, LedgerError> {
        match self {
            Step::Submit => machine.submit(),
            Step::Approve => machine.approve(),
            Step::Activate => machine.activate(),
            Step::Settle(amount) => machine.settle(Decimal::from(amount)),
            Step::Reject => machine.reject("rejected"),
            Step::Cancel => machine.cancel("cancelled"),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Snapshot {
    state: TransactionState,
    balance: Decimal,
    credit: Decimal,
    payments: usize,
    rejection_reason: Option<String>,
    cancellation_reason: Option<String>,
}

fn snapshot(machine: &TransactionStateMachine) -> Snapshot {
    Snapshot {
        state: machine.state(),
        balance: machine.balance(),
        credit: machine.credit(),
        payments: machine.payments().len(),
        rejection_reason: machine.rejection_reason().map(str::to_string),
        cancellation_reason: machine.cancellation_reason().map(str::to_string),
    }
}

fn sequences(max_len: usize) -> Vec<Vec<Step>> {
    let mut all = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];

    for _ in 0..max_len {
        let mut next = Vec::with_capacity(frontier.len() * ALPHABET.len());
        for prefix in &frontier {
            for step in ALPHABET {
                let mut sequence: Vec<Step> = prefix.clone();
                sequence.push(step);
                next.push(sequence);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }

    all
}

fn check_sequence(initial_balance: i64, sequence: &[Step]) {
    let audit = Arc::new(MemoryAuditLog::new());
    let mut machine =
        TransactionStateMachine::with_audit_log(Decimal::from(initial_balance), audit).unwrap();

    for &step in sequence {
        let before = snapshot(&machine);
        let result = step.apply(&mut machine);
        let after = snapshot(&machine);

        match result {
            Ok(state) => {
                assert_eq!(state, after.state, "{:?}", sequence);
                let expected = next_state(before.state, step.operation())
                    .unwrap_or_else(|e| panic!("{:?} succeeded illegally: {}", sequence, e));
                if after.state != before.state {
                    assert_eq!(after.state, expected, "{:?}", sequence);
                }
                assert!(!before.state.is_terminal(), "{:?}", sequence);

                let settled = matches!(step, Step::Settle(_));
                let expected_payments = before.payments + usize::from(settled);
                assert_eq!(after.payments, expected_payments, "{:?}", sequence);
            }
            Err(_) => {
                assert_eq!(before, after, "failed {:?} mutated {:?}", step, sequence);
            }
        }

        assert!(machine.balance() >= Decimal::ZERO, "{:?}", sequence);
        assert!(machine.credit() >= Decimal::ZERO, "{:?}", sequence);

        let (balance, credit) =
            Ledger::replay(machine.initial_balance(), machine.payments()).unwrap();
        assert_eq!(balance, machine.balance(), "{:?}", sequence);
        assert_eq!(credit, machine.credit(), "{:?}", sequence);
        assert!(machine.ledger().is_consistent(), "{:?}", sequence);

        if let Some(last) = machine.payments().last() {
            assert_eq!(last.balance_after, machine.balance());
            assert_eq!(last.credit_after, machine.credit());
        }
    }
}

#[rstest]
fn test_all_short_sequences_preserve_invariants(#[values(0, 40, 100)] initial_balance: i64) {
    for sequence in sequences(5) {
        check_sequence(initial_balance, &sequence);
    }
}

#[rstest]
fn test_terminal_states_reject_every_operation(
    #[values(TransactionState::Settled, TransactionState::Rejected, TransactionState::Cancelled)]
    terminal: TransactionState,
) {
    let mut machine = TransactionStateMachine::with_audit_log(
        Decimal::ZERO,
        Arc::new(MemoryAuditLog::new()),
    )
    .unwrap();
    machine.submit().unwrap();
    machine.approve().unwrap();
    machine.activate().unwrap();
    match terminal {
        TransactionState::Settled => machine.settle(Decimal::ONE).map(|_| ()),
        TransactionState::Rejected => machine.reject("r").map(|_| ()),
        _ => machine.cancel("c").map(|_| ()),
    }
    .unwrap();
    assert_eq!(machine.state(), terminal);

    for step in ALPHABET {
        let before = snapshot(&machine);
        assert!(step.apply(&mut machine).is_err());
        assert_eq!(snapshot(&machine), before);
    }
}
