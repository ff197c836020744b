use std::sync::{Mutex, PoisonError};

use dayplan_core::TabState;
use dayplan_service::ServiceError;
use tracing::debug;

use crate::calendar::CalendarEngine;
use crate::store::{DataStore, RefreshOutcome};

/// Tracks the active top-level view.
#[derive(Default)]
pub struct TabController {
    active: Mutex<TabState>,
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> TabState {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `tab` active and return the previous tab.
    pub fn set(&self, tab: TabState) -> TabState {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *active, tab)
    }

    /// Switch tabs and load what the new tab shows: the item lists for
    /// Today and Habits, the selected date's tasks for Calendar.
    pub async fn activate(
        &self,
        tab: TabState,
        store: &DataStore,
        calendar: &CalendarEngine,
    ) -> Result<RefreshOutcome, ServiceError> {
        let previous = self.set(tab);
        debug!(from = %previous, to = %tab, "tab switched");
        match tab {
            TabState::Today | TabState::Habits => store.refresh().await,
            TabState::Calendar => {
                calendar.enter_week();
                calendar
                    .fetch_for_date(store.service(), store.user_id())
                    .await
            }
        }
    }
}
