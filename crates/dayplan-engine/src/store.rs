use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dayplan_core::item::{CreateItem, UpdateItem};
use dayplan_core::{Item, ItemKey, ItemKind, Partition, UserId};
use dayplan_service::{ServiceError, TrackerService};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// The locally held copy of the user's tasks and habits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Bumped on every committed refresh.
    pub revision: u64,
    pub tasks: Vec<Item>,
    pub habits: Vec<Item>,
    /// Sequence number of the refresh that produced this state.
    seq: u64,
}

impl Collection {
    pub fn partition(&self) -> Partition {
        Partition::new(&self.tasks, &self.habits)
    }

    pub fn find(&self, key: ItemKey) -> Option<&Item> {
        let list = match key.kind {
            ItemKind::Task => &self.tasks,
            ItemKind::Habit => &self.habits,
        };
        list.iter().find(|i| i.id == key.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched lists replaced the collection.
    Applied { revision: u64 },
    /// A newer refresh was issued while this one was in flight; its result
    /// was dropped.
    Superseded,
}

/// Result of a mutation that the server accepted. The follow-up refresh
/// may still have failed, leaving the local copy stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Refreshed(RefreshOutcome),
    Stale(ServiceError),
}

/// Owns the item collection. The only writer is [`DataStore::refresh`],
/// which swaps the whole collection at once.
pub struct DataStore {
    service: Arc<dyn TrackerService>,
    user_id: UserId,
    collection: watch::Sender<Collection>,
    issued: AtomicU64,
}

impl DataStore {
    pub fn new(service: Arc<dyn TrackerService>, user_id: UserId) -> Self {
        let (collection, _) = watch::channel(Collection::default());
        Self {
            service,
            user_id,
            collection,
            issued: AtomicU64::new(0),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub(crate) fn service(&self) -> &dyn TrackerService {
        self.service.as_ref()
    }

    /// Change notifications fire once per committed refresh.
    pub fn subscribe(&self) -> watch::Receiver<Collection> {
        self.collection.subscribe()
    }

    pub fn snapshot(&self) -> Collection {
        self.collection.borrow().clone()
    }

    pub fn partition(&self) -> Partition {
        self.collection.borrow().partition()
    }

    pub fn find(&self, key: ItemKey) -> Option<Item> {
        self.collection.borrow().find(key).cloned()
    }

    /// Fetch tasks and habits concurrently and replace the collection.
    ///
    /// On failure the previous collection stays in place. Results of a
    /// refresh that has been overtaken by a newer one are discarded, so a
    /// slow response can never overwrite fresher state.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ServiceError> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, user_id = self.user_id, "refresh started");

        let (tasks, habits) = tokio::join!(
            self.service.list_tasks(self.user_id, None),
            self.service.list_habits(self.user_id),
        );

        if self.issued.load(Ordering::SeqCst) != seq {
            debug!(seq, "refresh superseded, dropping result");
            return Ok(RefreshOutcome::Superseded);
        }

        let (tasks, habits) = match (tasks, habits) {
            (Ok(t), Ok(h)) => (t, h),
            (Err(e), _) | (_, Err(e)) => {
                warn!(seq, error = %e, "refresh failed, keeping previous items");
                return Err(e);
            }
        };

        let tasks: Vec<Item> = tasks.into_iter().map(Item::from).collect();
        let habits: Vec<Item> = habits.into_iter().map(Item::from).collect();
        let mut revision = None;
        self.collection.send_if_modified(|c| {
            if seq <= c.seq {
                return false;
            }
            c.seq = seq;
            c.revision += 1;
            c.tasks = tasks;
            c.habits = habits;
            revision = Some(c.revision);
            true
        });

        match revision {
            Some(revision) => {
                debug!(seq, revision, "refresh applied");
                Ok(RefreshOutcome::Applied { revision })
            }
            None => Ok(RefreshOutcome::Superseded),
        }
    }

    /// Refresh after a successful mutation, folding a refresh error into
    /// the outcome instead of failing the mutation.
    pub(crate) async fn sync(&self) -> MutationOutcome {
        match self.refresh().await {
            Ok(outcome) => MutationOutcome::Refreshed(outcome),
            Err(e) => MutationOutcome::Stale(e),
        }
    }

    pub async fn add_item(
        &self,
        kind: ItemKind,
        title: &str,
        date: Option<NaiveDate>,
    ) -> Result<MutationOutcome, EngineError> {
        let input = CreateItem::new(kind, self.user_id, title, date)?;
        self.service.add_item(kind, &input).await?;
        info!(%kind, title = %input.title, "item added");
        Ok(self.sync().await)
    }

    pub async fn update_item(
        &self,
        key: ItemKey,
        title: &str,
    ) -> Result<MutationOutcome, EngineError> {
        let update = UpdateItem::new(title)?;
        self.service.update_item(key, &update).await?;
        info!(%key, "item renamed");
        Ok(self.sync().await)
    }

    pub async fn delete_item(&self, key: ItemKey) -> Result<MutationOutcome, EngineError> {
        self.service.delete_item(key).await?;
        info!(%key, "item deleted");
        Ok(self.sync().await)
    }
}
