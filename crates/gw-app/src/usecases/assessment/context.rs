use std::collections::HashSet;
use std::sync::Arc;

use gw_core::ids::PaymentReference;
use gw_core::orchestration::OrchestrationState;
use tokio::sync::{Mutex, MutexGuard, TryLockError};
use tokio_util::sync::CancellationToken;

/// Shared assessment context: state, dispatch lock and per-page bookkeeping.
///
/// ## Lock Ordering
/// When acquiring several locks, acquire `dispatch_lock` first, then the
/// others. `state` and `watch` are never held across an await point other
/// than their own acquisition.
pub struct AssessmentContext {
    state: Mutex<OrchestrationState>,
    /// Serializes dispatch so that transition, actions and state update run
    /// as one unit.
    dispatch_lock: Mutex<()>,
    /// References that already produced a created or refined evaluation.
    redeemed: Mutex<HashSet<PaymentReference>>,
    /// Cancels the running watch on detach.
    watch: Mutex<Option<CancellationToken>>,
}

impl Default for AssessmentContext {
    fn default() -> Self {
        Self::new(OrchestrationState::Start)
    }
}

impl AssessmentContext {
    pub fn new(initial_state: OrchestrationState) -> Self {
        Self {
            state: Mutex::new(initial_state),
            dispatch_lock: Mutex::new(()),
            redeemed: Mutex::new(HashSet::new()),
            watch: Mutex::new(None),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Does NOT acquire `dispatch_lock`.
    pub async fn get_state(&self) -> OrchestrationState {
        self.state.lock().await.clone()
    }

    pub async fn acquire_dispatch_lock(&self) -> MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Fails immediately when another dispatch is in flight.
    pub fn try_acquire_dispatch_lock(&self) -> Result<MutexGuard<'_, ()>, TryLockError> {
        self.dispatch_lock.try_lock()
    }

    /// Only called with `dispatch_lock` held.
    pub async fn set_state(&self, state: OrchestrationState) {
        *self.state.lock().await = state;
    }

    pub async fn is_redeemed(&self, reference: &PaymentReference) -> bool {
        self.redeemed.lock().await.contains(reference)
    }

    pub async fn mark_redeemed(&self, reference: PaymentReference) {
        self.redeemed.lock().await.insert(reference);
    }

    /// Registers a fresh token for a new watch, cancelling any previous one.
    pub async fn begin_watch(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.watch.lock().await.replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    pub async fn end_watch(&self) {
        self.watch.lock().await.take();
    }

    /// Cancels the running watch, if any. Returns whether one was running.
    pub async fn cancel_watch(&self) -> bool {
        match self.watch.lock().await.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
