//! Pending OS prompt tracking
//!
//! Each launch of the OS permission prompt gets a UUID. The negotiation parks
//! a oneshot receiver while the prompt is on screen; the host's result
//! callback completes the matching sender.
//!
//! ```text
//! ┌──────────────────┐
//! │ request_grants() │ → Generate UUID, insert sender, launch prompt
//! └────────┬─────────┘
//!          │
//!          ├─ Pending: HashMap<String, oneshot::Sender<PromptResults>>
//!          │
//!          ↓
//! ┌──────────────────────────┐
//! │ on_permission_result()   │ → Remove sender, deliver results
//! └──────────────────────────┘
//! ```
//!
//! Dropping a sender (via [`PendingPrompts::cancel`] or
//! [`PendingPrompts::cancel_all`]) wakes the parked negotiation with a
//! receive error, which it treats as cancellation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Per-capability answers from the OS prompt
pub type PromptResults = HashMap<String, bool>;

/// Tracks OS prompts awaiting results
#[derive(Clone, Default)]
pub(crate) struct PendingPrompts {
    /// Map of request_id → result sender
    inner: Arc<Mutex<HashMap<String, oneshot::Sender<PromptResults>>>>,
}

impl PendingPrompts {
    /// Create a new empty tracker
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<PromptResults>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Park the sender for a launched prompt
    pub(crate) fn insert(&self, id: String, sender: oneshot::Sender<PromptResults>) {
        self.lock().insert(id, sender);
    }

    /// Deliver results for a prompt
    ///
    /// Returns `false` when the id is unknown (stale, already completed, or
    /// cancelled) or the negotiation stopped waiting.
    pub(crate) fn complete(&self, id: &str, results: PromptResults) -> bool {
        let sender = self.lock().remove(id);
        match sender {
            Some(sender) => sender.send(results).is_ok(),
            None => false,
        }
    }

    /// Drop a single pending prompt without delivering results
    ///
    /// Returns whether the id was still parked.
    pub(crate) fn cancel(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Drop every pending prompt; returns how many were dropped
    pub(crate) fn cancel_all(&self) -> usize {
        let mut inner = self.lock();
        let count = inner.len();
        inner.clear();
        count
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}
