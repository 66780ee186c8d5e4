//! Transition table for the transaction lifecycle
//!
//! Every legal `(state, operation)` pair and the state it leads to is listed
//! in [`next_state`]. Anything not listed is an illegal transition.
//!
//! ```text
//! Draft ──submit──▶ Submitted ──approve──▶ Approved ──activate──▶ Active ──settle──▶ Settled
//!                                             │                     │
//!                                             └──reject──▶ Rejected ◀──reject──┤
//!                                                                   └──cancel──▶ Cancelled
//! ```

use crate::types::{LedgerError, Operation, TransactionState};

/// Look up the state an operation leads to
///
/// # Arguments
///
/// * `state` - The current state
/// * `operation` - The attempted operation
///
/// # Returns
///
/// * `Ok(TransactionState)` - The destination state
/// * `Err(LedgerError::InvalidStateTransition)` - If the operation is not legal from `state`
///
/// Note that `Active --settle--> Settled` only says the edge exists. Whether a
/// settlement actually closes the transaction also depends on the balance,
/// which the state machine checks.
pub fn next_state(
    state: TransactionState,
    operation: Operation,
) -> Result<TransactionState, LedgerError> {
    use Operation::*;
    use TransactionState::*;

    match (state, operation) {
        (Draft, Submit) => Ok(Submitted),
        (Submitted, Approve) => Ok(Approved),
        (Approved, Activate) => Ok(Active),
        (Active, Settle) => Ok(Settled),
        (Approved | Active, Reject) => Ok(Rejected),
        (Active, Cancel) => Ok(Cancelled),
        (state, operation) => Err(LedgerError::invalid_state_transition(operation, state)),
    }
}

/// Operations that are legal from `state`, in lifecycle order
pub fn allowed_operations(state: TransactionState) -> Vec<Operation> {
    Operation::ALL
        .into_iter()
        .filter(|&operation| next_state(state, operation).is_ok())
        .collect()
}
