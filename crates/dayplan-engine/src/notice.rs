use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// The single notice slot. Posting replaces whatever is shown; each notice
/// dismisses itself after the TTL unless it was replaced first.
pub struct Notices {
    current: Arc<watch::Sender<Option<Notice>>>,
    next_id: AtomicU64,
    ttl: Duration,
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            current: Arc::new(tx),
            next_id: AtomicU64::new(1),
            ttl,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.current.subscribe()
    }

    pub fn current(&self) -> Option<Notice> {
        self.current.borrow().clone()
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.post(NoticeLevel::Info, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.post(NoticeLevel::Error, message.into())
    }

    fn post(&self, level: NoticeLevel, message: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, ?level, %message, "notice posted");
        self.current.send_replace(Some(Notice { id, level, message }));

        // Outside a runtime the notice simply stays until dismissed.
        if let Ok(handle) = Handle::try_current() {
            let current = Arc::clone(&self.current);
            let ttl = self.ttl;
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                clear_if(&current, id);
            });
        }
        id
    }

    pub fn dismiss(&self) {
        self.current.send_if_modified(|slot| slot.take().is_some());
    }
}

fn clear_if(current: &watch::Sender<Option<Notice>>, id: u64) {
    current.send_if_modified(|slot| match slot {
        Some(notice) if notice.id == id => {
            *slot = None;
            true
        }
        _ => false,
    });
}
