use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use dayplan_core::{ItemKind, SelectedItem};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::EngineError;
use crate::events::UiEvent;
use crate::store::{DataStore, MutationOutcome};

/// How a press on an item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Released before the threshold.
    Tap,
    /// Held past the threshold; the context menu is open.
    LongPress,
    /// No press was being tracked.
    Idle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Add {
        kind: ItemKind,
        date: Option<NaiveDate>,
    },
    Edit {
        item: SelectedItem,
    },
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }

    /// Text the title field starts with.
    pub fn initial_title(&self) -> &str {
        match self {
            ModalState::Edit { item } => &item.title,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(MutationOutcome),
    /// Another save was still in flight; nothing was sent.
    Suppressed,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the saving flag when the save settles or is abandoned.
struct SavingFlag<'a>(&'a AtomicBool);

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Long-press detection, the item context menu and the add/edit modal.
pub struct Interaction {
    long_press: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    menu: Arc<Mutex<Option<SelectedItem>>>,
    modal: Mutex<ModalState>,
    saving: AtomicBool,
    events: broadcast::Sender<UiEvent>,
}

impl Interaction {
    pub fn new(long_press: Duration, events: broadcast::Sender<UiEvent>) -> Self {
        Self {
            long_press,
            timer: Mutex::new(None),
            menu: Arc::new(Mutex::new(None)),
            modal: Mutex::new(ModalState::Closed),
            saving: AtomicBool::new(false),
            events,
        }
    }

    // -- Long press --

    /// Start tracking a press on `item`. Presses on the item's checkbox are
    /// plain toggles and never arm the timer. Must run inside a tokio runtime.
    pub fn press_started(&self, item: SelectedItem, on_checkbox: bool) -> bool {
        if on_checkbox {
            return false;
        }
        let menu = Arc::clone(&self.menu);
        let events = self.events.clone();
        let threshold = self.long_press;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(threshold).await;
            debug!(id = item.id, kind = %item.kind, "long press, opening context menu");
            *lock(&menu) = Some(item.clone());
            let _ = events.send(UiEvent::ContextMenuOpened(item));
        });
        if let Some(previous) = lock(&self.timer).replace(handle) {
            previous.abort();
        }
        true
    }

    /// Finish the current press. Before the threshold this cancels the timer.
    pub fn press_released(&self) -> PressOutcome {
        let Some(handle) = lock(&self.timer).take() else {
            return PressOutcome::Idle;
        };
        if handle.is_finished() {
            PressOutcome::LongPress
        } else {
            handle.abort();
            PressOutcome::Tap
        }
    }

    // -- Context menu --

    pub fn menu_item(&self) -> Option<SelectedItem> {
        lock(&self.menu).clone()
    }

    pub fn is_menu_open(&self) -> bool {
        lock(&self.menu).is_some()
    }

    pub fn close_menu(&self) {
        if lock(&self.menu).take().is_some() {
            let _ = self.events.send(UiEvent::ContextMenuClosed);
        }
    }

    /// Menu "Edit": close the menu and open the modal on the selected item.
    pub fn edit_selected(&self) -> Result<ModalState, EngineError> {
        let item = lock(&self.menu).take().ok_or(EngineError::NothingSelected)?;
        let _ = self.events.send(UiEvent::ContextMenuClosed);
        Ok(self.open_modal(ModalState::Edit { item }))
    }

    /// Menu "Delete": delete the selected item, then close the menu.
    pub async fn delete_selected(&self, store: &DataStore) -> Result<MutationOutcome, EngineError> {
        let item = self.menu_item().ok_or(EngineError::NothingSelected)?;
        let result = store.delete_item(item.key()).await;
        self.close_menu();
        result
    }

    // -- Modal --

    pub fn modal(&self) -> ModalState {
        lock(&self.modal).clone()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    pub fn open_add(&self, kind: ItemKind, date: Option<NaiveDate>) -> ModalState {
        self.open_modal(ModalState::Add { kind, date })
    }

    fn open_modal(&self, state: ModalState) -> ModalState {
        *lock(&self.modal) = state.clone();
        let _ = self.events.send(UiEvent::ModalOpened(state.clone()));
        state
    }

    pub fn close_modal(&self) {
        let was_open = std::mem::take(&mut *lock(&self.modal)).is_open();
        if was_open {
            let _ = self.events.send(UiEvent::ModalClosed);
        }
    }

    /// Submit the modal. While a save is in flight further saves are
    /// suppressed. On success the modal closes; on failure it stays open
    /// so the user can retry.
    pub async fn save(&self, store: &DataStore, title: &str) -> Result<SaveOutcome, EngineError> {
        let modal = self.modal();
        if !modal.is_open() {
            return Err(EngineError::ModalClosed);
        }
        if self.saving.swap(true, Ordering::SeqCst) {
            debug!("save already in flight, ignoring");
            return Ok(SaveOutcome::Suppressed);
        }
        let _flag = SavingFlag(&self.saving);

        let outcome = match &modal {
            ModalState::Add { kind, date } => store.add_item(*kind, title, *date).await?,
            ModalState::Edit { item } => store.update_item(item.key(), title).await?,
            ModalState::Closed => return Err(EngineError::ModalClosed),
        };
        self.close_modal();
        Ok(SaveOutcome::Saved(outcome))
    }
}

impl Drop for Interaction {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}
