pub mod calendar;
pub mod error;
pub mod item;
pub mod tab;
pub mod user;

pub use calendar::{DayCell, Locale, MonthGrid, WeekStrip, YearMonth};
pub use error::DayplanError;
pub use item::{
    CreateItem, Habit, Item, ItemId, ItemKey, ItemKind, Partition, SelectedItem, Task, UpdateItem,
};
pub use tab::TabState;
pub use user::{HostUser, Registration, UserId, UserIdentity};
