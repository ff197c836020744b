use async_trait::async_trait;
use chrono::NaiveDate;
use dayplan_core::item::{CreateItem, UpdateItem};
use dayplan_core::user::Registration;
use dayplan_core::{DayplanError, Habit, ItemKey, ItemKind, Task, UserId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No response was received, even after the retry.
    #[error("network failure: {0}")]
    Network(String),

    #[error("server error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Transport-level failure, as opposed to an answer from the server.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Network(_))
    }
}

impl From<DayplanError> for ServiceError {
    fn from(e: DayplanError) -> Self {
        ServiceError::InvalidInput(e.to_string())
    }
}

/// Operations of the remote task/habit API.
///
/// The engine programs against this trait.
/// `HttpService` talks to the real service over HTTP.
/// `MemoryService` keeps everything in process.
#[async_trait]
pub trait TrackerService: Send + Sync {
    async fn register(&self, registration: &Registration) -> Result<(), ServiceError>;

    // -- Reads --
    async fn list_tasks(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Task>, ServiceError>;
    async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, ServiceError>;

    // -- Mutations --
    async fn add_item(&self, kind: ItemKind, input: &CreateItem) -> Result<(), ServiceError>;
    async fn toggle_item(&self, key: ItemKey) -> Result<(), ServiceError>;
    async fn update_item(&self, key: ItemKey, update: &UpdateItem) -> Result<(), ServiceError>;
    async fn delete_item(&self, key: ItemKey) -> Result<(), ServiceError>;
}
