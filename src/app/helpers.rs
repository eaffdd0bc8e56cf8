//! Contains helper functions to reduce boilerplate code in other `app` modules.

use std::sync::{Arc, Mutex};

use super::state::AppState;
use crate::core::TransferGate;

/// Locks the `AppState`, runs `f` against it and returns its result.
pub fn with_state<F, R>(state: &Arc<Mutex<AppState>>, f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    f(&mut state_guard)
}

/// Clones the transfer gate out of the state so intake and consume run
/// without holding the state lock.
pub fn transfer_gate(state: &Arc<Mutex<AppState>>) -> Arc<TransferGate> {
    with_state(state, |s| s.transfer.clone())
}
