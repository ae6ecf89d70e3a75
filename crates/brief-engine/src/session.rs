//! Per-session in-flight fan-out tracking.
//!
//! Only one fan-out may be in flight per chat/request session. Starting
//! a new one cancels the previous token, so a superseded analysis stops
//! at its next suspension point and its results are discarded.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::watch;
use tracing::debug;

/// Cooperative cancellation token handed to a fan-out.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that can never be cancelled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        // The sender is dropped; the receiver keeps reporting false.
        Self { rx }
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Tracks the active fan-out token per session.
#[derive(Debug, Default)]
pub struct SessionTracker {
    active: Mutex<HashMap<String, watch::Sender<bool>>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fan-out for a session, cancelling any prior one.
    pub fn begin(&self, session_id: &str) -> CancelToken {
        let (tx, rx) = watch::channel(false);

        let mut active = self.active.lock().unwrap();
        if let Some(prior) = active.insert(session_id.to_string(), tx) {
            debug!(session_id, "Cancelling superseded fan-out");
            let _ = prior.send(true);
        }

        CancelToken { rx }
    }

    /// Mark a session's fan-out as finished, releasing its token.
    ///
    /// Only the run that owns the registered token may release it: if a
    /// superseding `begin` has already replaced the entry, the stale
    /// finish is a no-op and the newer fan-out stays cancellable.
    pub fn finish(&self, session_id: &str, token: &CancelToken) {
        let mut active = self.active.lock().unwrap();
        let owns_entry = active
            .get(session_id)
            .is_some_and(|tx| token.rx.same_channel(&tx.subscribe()));
        if owns_entry {
            active.remove(session_id);
        }
    }

    /// Number of sessions with an in-flight fan-out.
    pub fn in_flight(&self) -> usize {
        self.active.lock().unwrap().len()
    }
}
