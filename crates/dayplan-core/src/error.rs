use thiserror::Error;

use crate::calendar::YearMonth;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DayplanError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("day {day} does not exist in {month}")]
    DayOutOfRange { day: u32, month: YearMonth },

    #[error("moving {months} months from {from} leaves the supported date range")]
    MonthOutOfRange { from: YearMonth, months: i32 },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
