use chrono::NaiveDate;
use dayplan_core::{ItemId, ItemKind, SelectedItem, TabState};

use crate::calendar::CalendarView;
use crate::interaction::ModalState;

/// Something the user asked for. Presentation code translates raw input
/// into intents and hands them to [`Session::dispatch`](crate::Session::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Refresh,
    SwitchTab(TabState),
    ToggleRequested { kind: ItemKind, id: ItemId },

    // -- Long press / context menu --
    PressStarted { item: SelectedItem, on_checkbox: bool },
    PressReleased,
    EditSelected,
    DeleteSelected,
    CloseMenu,

    // -- Modal --
    OpenAdd { kind: ItemKind },
    Save { title: String },
    CloseModal,

    // -- Calendar --
    MonthDaySelected { day: u32 },
    DaySelected { date: NaiveDate },
    ChangePeriod { offset: i32 },
    ResetToToday,
    ShowMonth,

    DismissNotice,
}

/// Feedback the host should play on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    /// Tab switches.
    Light,
    /// A task changed state.
    Impact,
    /// A habit changed state.
    Success,
}

/// UI state changes that are not carried by the item or calendar watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    TabChanged(TabState),
    CalendarViewChanged(CalendarView),
    ContextMenuOpened(SelectedItem),
    ContextMenuClosed,
    ModalOpened(ModalState),
    ModalClosed,
    Haptic(Haptic),
}
