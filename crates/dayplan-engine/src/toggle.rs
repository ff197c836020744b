use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dayplan_core::ItemKey;
use dayplan_service::ServiceError;
use tracing::{debug, warn};

use crate::store::{DataStore, MutationOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A toggle for the same item was already in flight; nothing was sent.
    Dropped,
    /// The server accepted the toggle.
    Applied(MutationOutcome),
    /// The server rejected the toggle or could not be reached. The store
    /// was refreshed regardless.
    Failed(ServiceError),
}

/// Set of items with a toggle request in flight.
#[derive(Default)]
pub struct ToggleGuard {
    pending: Arc<Mutex<HashSet<ItemKey>>>,
}

/// Marks a key pending for as long as it lives.
struct PendingToggle {
    key: ItemKey,
    pending: Arc<Mutex<HashSet<ItemKey>>>,
}

impl Drop for PendingToggle {
    fn drop(&mut self) {
        lock(&self.pending).remove(&self.key);
    }
}

fn lock(set: &Mutex<HashSet<ItemKey>>) -> MutexGuard<'_, HashSet<ItemKey>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ToggleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, key: ItemKey) -> bool {
        lock(&self.pending).contains(&key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    fn try_begin(&self, key: ItemKey) -> Option<PendingToggle> {
        if !lock(&self.pending).insert(key) {
            return None;
        }
        Some(PendingToggle {
            key,
            pending: Arc::clone(&self.pending),
        })
    }

    /// Flip an item's completion on the server, at most once at a time per
    /// item. A call while the item is pending is dropped without a request.
    ///
    /// The key is released as soon as the request settles, before the
    /// follow-up refresh. Dropping the returned future releases it too.
    pub async fn toggle(&self, store: &DataStore, key: ItemKey) -> ToggleOutcome {
        let Some(pending) = self.try_begin(key) else {
            debug!(%key, "toggle already pending, ignoring");
            return ToggleOutcome::Dropped;
        };

        let result = store.service().toggle_item(key).await;
        drop(pending);

        match result {
            Ok(()) => ToggleOutcome::Applied(store.sync().await),
            Err(e) => {
                warn!(%key, error = %e, "toggle failed");
                if let Err(refresh_err) = store.refresh().await {
                    warn!(error = %refresh_err, "refresh after failed toggle also failed");
                }
                ToggleOutcome::Failed(e)
            }
        }
    }
}
