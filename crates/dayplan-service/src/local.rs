use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use dayplan_core::item::{CreateItem, UpdateItem};
use dayplan_core::user::Registration;
use dayplan_core::{Habit, ItemId, ItemKey, ItemKind, Task, UserId};

use crate::{ServiceError, TrackerService};

/// In-process implementation with the same observable behaviour as the
/// remote API. Used for offline mode and in tests.
#[derive(Default)]
pub struct MemoryService {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, String>,
    tasks: BTreeMap<ItemId, (UserId, Task)>,
    habits: BTreeMap<ItemId, (UserId, Habit)>,
    next_task_id: ItemId,
    next_habit_id: ItemId,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn task(&self, id: ItemId) -> Option<Task> {
        self.state().tasks.get(&id).map(|(_, t)| t.clone())
    }

    pub fn habit(&self, id: ItemId) -> Option<Habit> {
        self.state().habits.get(&id).map(|(_, h)| h.clone())
    }

    pub fn user_name(&self, user_id: UserId) -> Option<String> {
        self.state().users.get(&user_id).cloned()
    }
}

impl MemoryState {
    fn require_user(&self, user_id: UserId) -> Result<(), ServiceError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("user {user_id}")))
        }
    }
}

fn missing(key: ItemKey) -> ServiceError {
    ServiceError::NotFound(key.to_string())
}

#[async_trait]
impl TrackerService for MemoryService {
    async fn register(&self, registration: &Registration) -> Result<(), ServiceError> {
        // Registering twice keeps the first name, like the remote upsert.
        self.state()
            .users
            .entry(registration.tg_id)
            .or_insert_with(|| registration.name.clone());
        Ok(())
    }

    async fn list_tasks(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Task>, ServiceError> {
        let state = self.state();
        // Newest first.
        Ok(state
            .tasks
            .values()
            .rev()
            .filter(|(owner, t)| *owner == user_id && date.map_or(true, |d| t.date == Some(d)))
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, ServiceError> {
        let state = self.state();
        Ok(state
            .habits
            .values()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, h)| h.clone())
            .collect())
    }

    async fn add_item(&self, kind: ItemKind, input: &CreateItem) -> Result<(), ServiceError> {
        let title = dayplan_core::item::validate_title(&input.title)?;
        let mut state = self.state();
        state.require_user(input.user_id)?;
        match kind {
            ItemKind::Task => {
                state.next_task_id += 1;
                let id = state.next_task_id;
                let task = Task {
                    id,
                    title,
                    is_completed: false,
                    date: input.date,
                };
                state.tasks.insert(id, (input.user_id, task));
            }
            ItemKind::Habit => {
                state.next_habit_id += 1;
                let id = state.next_habit_id;
                let habit = Habit {
                    id,
                    title,
                    is_completed_today: false,
                };
                state.habits.insert(id, (input.user_id, habit));
            }
        }
        Ok(())
    }

    async fn toggle_item(&self, key: ItemKey) -> Result<(), ServiceError> {
        let mut state = self.state();
        match key.kind {
            ItemKind::Task => {
                let (_, task) = state.tasks.get_mut(&key.id).ok_or_else(|| missing(key))?;
                task.is_completed = !task.is_completed;
            }
            ItemKind::Habit => {
                let (_, habit) = state.habits.get_mut(&key.id).ok_or_else(|| missing(key))?;
                habit.is_completed_today = !habit.is_completed_today;
            }
        }
        Ok(())
    }

    async fn update_item(&self, key: ItemKey, update: &UpdateItem) -> Result<(), ServiceError> {
        let title = dayplan_core::item::validate_title(&update.title)?;
        let mut state = self.state();
        match key.kind {
            ItemKind::Task => {
                let (_, task) = state.tasks.get_mut(&key.id).ok_or_else(|| missing(key))?;
                task.title = title;
            }
            ItemKind::Habit => {
                let (_, habit) = state.habits.get_mut(&key.id).ok_or_else(|| missing(key))?;
                habit.title = title;
            }
        }
        Ok(())
    }

    async fn delete_item(&self, key: ItemKey) -> Result<(), ServiceError> {
        let mut state = self.state();
        let removed = match key.kind {
            ItemKind::Task => state.tasks.remove(&key.id).is_some(),
            ItemKind::Habit => state.habits.remove(&key.id).is_some(),
        };
        if removed {
            Ok(())
        } else {
            Err(missing(key))
        }
    }
}
