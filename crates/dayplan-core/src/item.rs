use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DayplanError;
use crate::user::UserId;

pub type ItemId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Task,
    Habit,
}

impl ItemKind {
    pub const ALL: &[ItemKind] = &[ItemKind::Task, ItemKind::Habit];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Habit => "habit",
        }
    }

    /// Path segment of the remote collection, e.g. `/api/tasks/...`.
    pub fn collection(&self) -> &'static str {
        match self {
            ItemKind::Task => "tasks",
            ItemKind::Habit => "habits",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ItemKind::Task => "Task",
            ItemKind::Habit => "Habit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "task" => Some(ItemKind::Task),
            "habit" => Some(ItemKind::Habit),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Identity of an item across both collections. Task and habit ids come
/// from separate sequences, so the kind is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub kind: ItemKind,
    pub id: ItemId,
}

impl ItemKey {
    pub fn new(kind: ItemKind, id: ItemId) -> Self {
        Self { kind, id }
    }

    pub fn task(id: ItemId) -> Self {
        Self::new(ItemKind::Task, id)
    }

    pub fn habit(id: ItemId) -> Self {
        Self::new(ItemKind::Habit, id)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.as_str(), self.id)
    }
}

/// Task as served by `GET /api/tasks/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: ItemId,
    pub title: String,
    #[serde(deserialize_with = "flag")]
    pub is_completed: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Habit as served by `GET /api/habits/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: ItemId,
    pub title: String,
    #[serde(deserialize_with = "flag")]
    pub is_completed_today: bool,
}

/// The service stores completion as a boolean column but has also served it
/// as `0`/`1`; accept both.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

/// Kind-agnostic view of a task or habit held by the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub completed: bool,
    pub date: Option<NaiveDate>,
}

impl Item {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.kind, self.id)
    }

    pub fn selected(&self) -> SelectedItem {
        SelectedItem {
            id: self.id,
            kind: self.kind,
            title: self.title.clone(),
        }
    }
}

impl From<Task> for Item {
    fn from(task: Task) -> Self {
        Item {
            id: task.id,
            kind: ItemKind::Task,
            title: task.title,
            completed: task.is_completed,
            date: task.date,
        }
    }
}

impl From<Habit> for Item {
    fn from(habit: Habit) -> Self {
        Item {
            id: habit.id,
            kind: ItemKind::Habit,
            title: habit.title,
            completed: habit.is_completed_today,
            date: None,
        }
    }
}

/// Reference to an item captured when its context menu opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
}

impl SelectedItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.kind, self.id)
    }
}

/// Body of `POST /api/{tasks,habits}/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItem {
    pub user_id: UserId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl CreateItem {
    /// Validates the title and drops the date for habits, which are not
    /// scheduled on a calendar day.
    pub fn new(
        kind: ItemKind,
        user_id: UserId,
        title: &str,
        date: Option<NaiveDate>,
    ) -> Result<Self, DayplanError> {
        Ok(Self {
            user_id,
            title: validate_title(title)?,
            date: match kind {
                ItemKind::Task => date,
                ItemKind::Habit => None,
            },
        })
    }
}

/// Body of `POST /api/{tasks,habits}/update/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub title: String,
}

impl UpdateItem {
    pub fn new(title: &str) -> Result<Self, DayplanError> {
        Ok(Self {
            title: validate_title(title)?,
        })
    }
}

/// Trim a user-entered title, rejecting it if nothing is left.
pub fn validate_title(raw: &str) -> Result<String, DayplanError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DayplanError::EmptyTitle);
    }
    Ok(title.to_string())
}

/// Display partition of the collection, recomputed on every render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub active_tasks: Vec<Item>,
    pub completed_tasks: Vec<Item>,
    pub habits: Vec<Item>,
}

impl Partition {
    pub fn new(tasks: &[Item], habits: &[Item]) -> Self {
        let (completed_tasks, active_tasks): (Vec<Item>, Vec<Item>) =
            tasks.iter().cloned().partition(|t| t.completed);
        Self {
            active_tasks,
            completed_tasks,
            habits: habits.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active_tasks.is_empty() && self.completed_tasks.is_empty() && self.habits.is_empty()
    }

    /// Number of habits marked done today.
    pub fn habits_done(&self) -> usize {
        self.habits.iter().filter(|h| h.completed).count()
    }
}
