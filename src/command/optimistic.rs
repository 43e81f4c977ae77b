//! Optimistic mutation executor
//!
//! Protocol: apply the local transition under the write lock and keep a
//! snapshot of what it replaced, release the lock, await the remote call,
//! and on failure put the snapshot back. The lock is never held across the
//! remote call, so renders (and taps) see the optimistic value meanwhile.

use crate::backend::{MutationFailure, MutationResult};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Screen state shared between the pipeline and direct UI input
pub type SharedState<S> = Arc<RwLock<S>>;

pub fn shared<S>(state: S) -> SharedState<S> {
    Arc::new(RwLock::new(state))
}

/// How an optimistic mutation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Remote call confirmed; the local change stays
    Applied,
    /// Remote call failed; the local change was reverted
    RolledBack(MutationFailure),
    /// The local transition did not apply, the remote was never called
    Skipped,
}

/// Run one optimistic mutation
///
/// `apply` returns the snapshot needed to undo its change, or `None` when
/// the transition does not apply to the current state. `revert` receives
/// that snapshot after a remote failure.
pub async fn execute<S, P, A, R, F, Fut>(
    state: &SharedState<S>,
    apply: A,
    revert: R,
    remote: F,
) -> MutationOutcome
where
    A: FnOnce(&mut S) -> Option<P>,
    R: FnOnce(&mut S, P),
    F: FnOnce() -> Fut,
    Fut: Future<Output = MutationResult>,
{
    let snapshot = {
        let mut guard = state.write().await;
        match apply(&mut guard) {
            Some(snapshot) => snapshot,
            None => return MutationOutcome::Skipped,
        }
    };

    match remote().await {
        Ok(()) => MutationOutcome::Applied,
        Err(failure) => {
            let mut guard = state.write().await;
            revert(&mut guard, snapshot);
            tracing::warn!("optimistic change rolled back: {}", failure);
            MutationOutcome::RolledBack(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PolicyBlock;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i32,
    }

    #[tokio::test]
    async fn test_success_keeps_change() {
        let state = shared(Counter { value: 1 });
        let outcome = execute(
            &state,
            |s: &mut Counter| {
                let prev = s.value;
                s.value = 2;
                Some(prev)
            },
            |s: &mut Counter, prev| s.value = prev,
            || async { Ok(()) },
        )
        .await;

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(state.read().await.value, 2);
    }

    #[tokio::test]
    async fn test_failure_restores_snapshot_and_state_is_visible_during_call() {
        let state = shared(Counter { value: 1 });
        let observer = state.clone();

        let outcome = execute(
            &state,
            |s: &mut Counter| {
                let prev = s.value;
                s.value = 99;
                Some(prev)
            },
            |s: &mut Counter, prev| s.value = prev,
            || async move {
                // the optimistic value is readable while the call is in flight
                assert_eq!(observer.read().await.value, 99);
                Err(MutationFailure::Policy(PolicyBlock::FriendsOfFriends))
            },
        )
        .await;

        assert_eq!(
            outcome,
            MutationOutcome::RolledBack(MutationFailure::Policy(PolicyBlock::FriendsOfFriends))
        );
        assert_eq!(state.read().await.value, 1);
    }

    #[tokio::test]
    async fn test_skipped_transition_never_calls_remote() {
        let state = shared(Counter { value: 1 });
        let called = AtomicBool::new(false);
        let outcome = execute(
            &state,
            |_: &mut Counter| None::<i32>,
            |s: &mut Counter, prev| s.value = prev,
            || async {
                called.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert_eq!(outcome, MutationOutcome::Skipped);
        assert!(!called.load(Ordering::SeqCst));
    }
}
