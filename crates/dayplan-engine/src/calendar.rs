use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dayplan_core::calendar::{month_grid, week_strip};
use dayplan_core::{DayplanError, Item, Locale, MonthGrid, UserId, WeekStrip, YearMonth};
use dayplan_service::{ServiceError, TrackerService};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::store::RefreshOutcome;

/// Which calendar sub-view is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
}

/// Displayed month plus selected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    pub view_month: YearMonth,
    pub selected_date: NaiveDate,
}

/// What the calendar tab should draw right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarRender {
    Month(MonthGrid),
    Week(WeekStrip),
}

/// Tasks scheduled on one date, fetched separately from the main lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTasks {
    pub date: Option<NaiveDate>,
    pub tasks: Vec<Item>,
    seq: u64,
}

/// Cursor and sub-view, published together so observers see both change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    pub cursor: CalendarCursor,
    pub view: CalendarView,
}

pub struct CalendarEngine {
    state: watch::Sender<CalendarState>,
    clock: Arc<dyn Clock>,
    locale: Locale,
    tasks: watch::Sender<DateTasks>,
    issued: AtomicU64,
}

impl CalendarEngine {
    pub fn new(clock: Arc<dyn Clock>, locale: Locale) -> Self {
        let today = clock.today();
        let (state, _) = watch::channel(CalendarState {
            cursor: CalendarCursor {
                view_month: YearMonth::of(today),
                selected_date: today,
            },
            view: CalendarView::Month,
        });
        let (tasks, _) = watch::channel(DateTasks::default());
        Self {
            state,
            clock,
            locale,
            tasks,
            issued: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> CalendarState {
        *self.state.borrow()
    }

    /// Notified whenever the cursor or the sub-view actually changes.
    pub fn subscribe_state(&self) -> watch::Receiver<CalendarState> {
        self.state.subscribe()
    }

    /// Apply `change` and notify subscribers only if something moved.
    fn update(&self, change: impl FnOnce(&mut CalendarState)) {
        self.state.send_if_modified(|state| {
            let before = *state;
            change(state);
            *state != before
        });
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.state.borrow().cursor
    }

    pub fn view(&self) -> CalendarView {
        self.state.borrow().view
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<DateTasks> {
        self.tasks.subscribe()
    }

    pub fn date_tasks(&self) -> DateTasks {
        self.tasks.borrow().clone()
    }

    /// Grid for the displayed month.
    pub fn month_grid(&self) -> MonthGrid {
        let cursor = self.cursor();
        month_grid(cursor.view_month, self.clock.today(), Some(cursor.selected_date))
    }

    /// Monday-to-Sunday strip around the selected date.
    pub fn week_strip(&self) -> WeekStrip {
        week_strip(self.cursor().selected_date, self.clock.today(), self.locale)
    }

    pub fn render(&self) -> CalendarRender {
        match self.view() {
            CalendarView::Month => CalendarRender::Month(self.month_grid()),
            CalendarView::Week => CalendarRender::Week(self.week_strip()),
        }
    }

    /// Pick a day of the displayed month and switch to the week strip.
    pub fn select_day(&self, day: u32) -> Result<NaiveDate, DayplanError> {
        let month = self.cursor().view_month;
        let date = month
            .day(day)
            .ok_or(DayplanError::DayOutOfRange { day, month })?;
        self.update(|state| {
            state.cursor.selected_date = date;
            state.view = CalendarView::Week;
        });
        debug!(%date, "calendar day selected");
        Ok(date)
    }

    /// Pick a date from the week strip. Stays in week view; the displayed
    /// month follows the date so the grid opens on it later.
    pub fn select_date(&self, date: NaiveDate) {
        self.update(|state| {
            state.cursor.selected_date = date;
            state.cursor.view_month = YearMonth::of(date);
            state.view = CalendarView::Week;
        });
    }

    /// Page the month grid. The selected date is left alone, and the cursor
    /// does not move at all when the target month is out of range.
    pub fn change_period(&self, offset: i32) -> Result<YearMonth, DayplanError> {
        let month = self.cursor().view_month.offset(offset)?;
        self.update(|state| state.cursor.view_month = month);
        Ok(month)
    }

    /// Jump back to today in whichever sub-view is active.
    pub fn reset_to_today(&self) -> CalendarRender {
        let today = self.clock.today();
        self.update(|state| {
            state.cursor = CalendarCursor {
                view_month: YearMonth::of(today),
                selected_date: today,
            };
        });
        self.render()
    }

    pub fn show_month(&self) {
        self.update(|state| state.view = CalendarView::Month);
    }

    /// Entering the calendar tab shows the week around the selected date.
    pub fn enter_week(&self) {
        self.update(|state| state.view = CalendarView::Week);
    }

    /// Load the tasks scheduled on the selected date. Only the calendar's
    /// own list is replaced; a result overtaken by a newer fetch is dropped.
    pub async fn fetch_for_date(
        &self,
        service: &dyn TrackerService,
        user_id: UserId,
    ) -> Result<RefreshOutcome, ServiceError> {
        let date = self.cursor().selected_date;
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let result = service.list_tasks(user_id, Some(date)).await;
        if self.issued.load(Ordering::SeqCst) != seq {
            debug!(seq, %date, "date fetch superseded, dropping result");
            return Ok(RefreshOutcome::Superseded);
        }
        let tasks: Vec<Item> = match result {
            Ok(tasks) => tasks.into_iter().map(Item::from).collect(),
            Err(e) => {
                warn!(%date, error = %e, "date fetch failed");
                return Err(e);
            }
        };

        let mut applied = false;
        self.tasks.send_if_modified(|current| {
            if seq <= current.seq {
                return false;
            }
            *current = DateTasks {
                date: Some(date),
                tasks,
                seq,
            };
            applied = true;
            true
        });

        Ok(if applied {
            RefreshOutcome::Applied { revision: seq }
        } else {
            RefreshOutcome::Superseded
        })
    }
}
