//! Client-side sync and scheduling engine.
//!
//! A [`Session`] owns all mutable state of one mini-app instance: the item
//! store, pending toggles, the calendar cursor, the context menu and modal,
//! the active tab and transient notices. Presentation code drives it with
//! [`Intent`]s and observes it through watch channels and [`UiEvent`]s.

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod interaction;
pub mod notice;
pub mod session;
pub mod store;
pub mod tabs;
pub mod toggle;

pub use calendar::{CalendarCursor, CalendarEngine, CalendarRender, CalendarState, CalendarView};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use error::EngineError;
pub use events::{Haptic, Intent, UiEvent};
pub use interaction::{Interaction, ModalState, PressOutcome, SaveOutcome};
pub use notice::{Notice, NoticeLevel, Notices};
pub use session::Session;
pub use store::{Collection, DataStore, MutationOutcome, RefreshOutcome};
pub use tabs::TabController;
pub use toggle::{ToggleGuard, ToggleOutcome};
