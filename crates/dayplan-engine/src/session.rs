use std::sync::Arc;

use chrono::NaiveDate;
use dayplan_core::{ItemId, ItemKey, ItemKind, SelectedItem, TabState, UserIdentity, YearMonth};
use dayplan_service::TrackerService;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::calendar::{CalendarEngine, CalendarRender, CalendarView};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{Haptic, Intent, UiEvent};
use crate::interaction::{Interaction, ModalState, PressOutcome, SaveOutcome};
use crate::notice::Notices;
use crate::store::{DataStore, MutationOutcome, RefreshOutcome};
use crate::tabs::TabController;
use crate::toggle::{ToggleGuard, ToggleOutcome};

const EVENT_CAPACITY: usize = 64;

/// All state of one mini-app instance, owned in one place.
///
/// Every public operation returns a value or a typed error; failures are
/// also posted to [`Notices`] so the presentation layer can show them.
pub struct Session {
    identity: UserIdentity,
    store: DataStore,
    toggles: ToggleGuard,
    calendar: CalendarEngine,
    interaction: Interaction,
    tabs: TabController,
    notices: Notices,
    events: broadcast::Sender<UiEvent>,
}

impl Session {
    pub fn new(
        service: Arc<dyn TrackerService>,
        identity: UserIdentity,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store: DataStore::new(service, identity.id),
            toggles: ToggleGuard::new(),
            calendar: CalendarEngine::new(clock, config.locale),
            interaction: Interaction::new(config.long_press, events.clone()),
            tabs: TabController::new(),
            notices: Notices::new(config.notice_ttl),
            identity,
            events,
        }
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn toggles(&self) -> &ToggleGuard {
        &self.toggles
    }

    pub fn calendar(&self) -> &CalendarEngine {
        &self.calendar
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn active_tab(&self) -> TabState {
        self.tabs.active()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: UiEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn report(&self, err: EngineError) -> EngineError {
        warn!(error = %err, "operation failed");
        self.notices.error(err.user_message());
        err
    }

    fn note_stale(&self, outcome: &MutationOutcome) {
        if let MutationOutcome::Stale(e) = outcome {
            self.report(EngineError::Service(e.clone()));
        }
    }

    /// Register the user with the service, then load their items. If
    /// registration fails nothing else is fetched.
    pub async fn start(&self) -> Result<RefreshOutcome, EngineError> {
        if self.identity.test_mode {
            self.notices
                .info("No user data from the host. Running in test mode.");
        }
        info!(user_id = self.identity.id, name = %self.identity.name, "session starting");
        self.store
            .service()
            .register(&self.identity.registration())
            .await
            .map_err(|e| self.report(e.into()))?;
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, EngineError> {
        self.store.refresh().await.map_err(|e| self.report(e.into()))
    }

    /// Reload the calendar's date list when it is on screen.
    async fn refresh_calendar_if_active(&self) {
        if self.tabs.active() == TabState::Calendar {
            if let Err(e) = self.fetch_calendar().await {
                warn!(error = %e, "calendar refresh after mutation failed");
            }
        }
    }

    async fn fetch_calendar(&self) -> Result<RefreshOutcome, EngineError> {
        self.calendar
            .fetch_for_date(self.store.service(), self.identity.id)
            .await
            .map_err(|e| self.report(e.into()))
    }

    // -- Tabs --

    pub async fn switch_tab(&self, tab: TabState) -> Result<RefreshOutcome, EngineError> {
        self.emit(UiEvent::Haptic(Haptic::Light));
        self.emit(UiEvent::TabChanged(tab));
        if tab == TabState::Calendar {
            self.emit(UiEvent::CalendarViewChanged(CalendarView::Week));
        }
        self.tabs
            .activate(tab, &self.store, &self.calendar)
            .await
            .map_err(|e| self.report(e.into()))
    }

    // -- Items --

    pub async fn toggle(&self, kind: ItemKind, id: ItemId) -> ToggleOutcome {
        let outcome = self.toggles.toggle(&self.store, ItemKey::new(kind, id)).await;
        match &outcome {
            ToggleOutcome::Applied(sync) => {
                let haptic = match kind {
                    ItemKind::Task => Haptic::Impact,
                    ItemKind::Habit => Haptic::Success,
                };
                self.emit(UiEvent::Haptic(haptic));
                self.note_stale(sync);
                self.refresh_calendar_if_active().await;
            }
            ToggleOutcome::Failed(e) => {
                self.report(EngineError::Service(e.clone()));
            }
            ToggleOutcome::Dropped => {}
        }
        outcome
    }

    pub fn press_started(&self, item: SelectedItem, on_checkbox: bool) -> bool {
        self.interaction.press_started(item, on_checkbox)
    }

    pub fn press_released(&self) -> PressOutcome {
        self.interaction.press_released()
    }

    pub fn edit_selected(&self) -> Result<ModalState, EngineError> {
        self.interaction
            .edit_selected()
            .map_err(|e| self.report(e))
    }

    pub async fn delete_selected(&self) -> Result<MutationOutcome, EngineError> {
        let outcome = self
            .interaction
            .delete_selected(&self.store)
            .await
            .map_err(|e| self.report(e))?;
        self.note_stale(&outcome);
        self.refresh_calendar_if_active().await;
        Ok(outcome)
    }

    /// Open the add modal. Tasks added from the calendar land on the
    /// selected date.
    pub fn open_add(&self, kind: ItemKind) -> ModalState {
        let date = match (kind, self.tabs.active()) {
            (ItemKind::Task, TabState::Calendar) => Some(self.calendar.cursor().selected_date),
            _ => None,
        };
        self.interaction.open_add(kind, date)
    }

    pub async fn save(&self, title: &str) -> Result<SaveOutcome, EngineError> {
        let outcome = self
            .interaction
            .save(&self.store, title)
            .await
            .map_err(|e| self.report(e))?;
        if let SaveOutcome::Saved(sync) = &outcome {
            self.note_stale(sync);
            self.refresh_calendar_if_active().await;
        }
        Ok(outcome)
    }

    // -- Calendar --

    /// Select a day of the displayed month, switch to the week strip and
    /// load that day's tasks.
    pub async fn select_month_day(&self, day: u32) -> Result<RefreshOutcome, EngineError> {
        self.calendar
            .select_day(day)
            .map_err(|e| self.report(e.into()))?;
        self.emit(UiEvent::CalendarViewChanged(CalendarView::Week));
        self.fetch_calendar().await
    }

    pub async fn select_date(&self, date: NaiveDate) -> Result<RefreshOutcome, EngineError> {
        self.calendar.select_date(date);
        self.fetch_calendar().await
    }

    /// Page the month grid; observers see the move on
    /// [`CalendarEngine::subscribe_state`].
    pub fn change_period(&self, offset: i32) -> Result<YearMonth, EngineError> {
        self.calendar
            .change_period(offset)
            .map_err(|e| self.report(e.into()))
    }

    pub async fn reset_to_today(&self) -> Result<CalendarRender, EngineError> {
        let render = self.calendar.reset_to_today();
        self.fetch_calendar().await?;
        Ok(render)
    }

    pub fn show_month(&self) {
        self.calendar.show_month();
        self.emit(UiEvent::CalendarViewChanged(CalendarView::Month));
    }

    /// Route an intent to the matching operation.
    pub async fn dispatch(&self, intent: Intent) -> Result<(), EngineError> {
        match intent {
            Intent::Refresh => {
                self.refresh().await?;
            }
            Intent::SwitchTab(tab) => {
                self.switch_tab(tab).await?;
            }
            Intent::ToggleRequested { kind, id } => {
                if let ToggleOutcome::Failed(e) = self.toggle(kind, id).await {
                    return Err(e.into());
                }
            }
            Intent::PressStarted { item, on_checkbox } => {
                self.press_started(item, on_checkbox);
            }
            Intent::PressReleased => {
                self.press_released();
            }
            Intent::EditSelected => {
                self.edit_selected()?;
            }
            Intent::DeleteSelected => {
                self.delete_selected().await?;
            }
            Intent::CloseMenu => self.interaction.close_menu(),
            Intent::OpenAdd { kind } => {
                self.open_add(kind);
            }
            Intent::Save { title } => {
                self.save(&title).await?;
            }
            Intent::CloseModal => self.interaction.close_modal(),
            Intent::MonthDaySelected { day } => {
                self.select_month_day(day).await?;
            }
            Intent::DaySelected { date } => {
                self.select_date(date).await?;
            }
            Intent::ChangePeriod { offset } => {
                self.change_period(offset)?;
            }
            Intent::ResetToToday => {
                self.reset_to_today().await?;
            }
            Intent::ShowMonth => self.show_month(),
            Intent::DismissNotice => self.notices.dismiss(),
        }
        Ok(())
    }
}
