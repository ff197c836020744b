//! Calendar arithmetic for the month/week day picker.
//!
//! Weeks are laid out Monday-first. Everything here is pure: "today" and the
//! selected date are passed in by the caller.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::DayplanError;

/// A calendar month, the unit the month grid pages through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DayplanError> {
        if !(1..=12).contains(&month) {
            return Err(DayplanError::InvalidInput(format!("month {month} out of range")));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DayplanError::InvalidInput(format!("year {year} out of range")));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Length of the month: distance from its first day to the first day of
    /// the next month, so leap years fall out of the date arithmetic.
    pub fn days_in_month(&self) -> u32 {
        match self.offset(1) {
            Ok(next) => (next.first_day() - self.first_day()).num_days() as u32,
            // Only the last representable month has no successor, and it is a December.
            Err(_) => 31,
        }
    }

    /// Move by whole months; negative offsets go backwards across years.
    /// Fails when the result falls outside the supported date range.
    pub fn offset(&self, months: i32) -> Result<Self, DayplanError> {
        let out_of_range = || DayplanError::MonthOutOfRange {
            from: *self,
            months,
        };
        let index = self
            .year
            .checked_mul(12)
            .and_then(|i| i.checked_add(self.month as i32 - 1))
            .and_then(|i| i.checked_add(months))
            .ok_or_else(out_of_range)?;
        Self::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
            .map_err(|_| out_of_range())
    }

    /// The given day of this month, if it exists.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Label language for weekday and month names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "ru" => Some(Locale::Ru),
            _ => None,
        }
    }

    pub fn weekday_abbrev(&self, weekday: Weekday) -> &'static str {
        let i = weekday.num_days_from_monday() as usize;
        match self {
            Locale::En => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][i],
            Locale::Ru => ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"][i],
        }
    }

    /// Column headers of the month grid, Monday first.
    pub fn weekday_header(&self) -> [&'static str; 7] {
        let mut header = [""; 7];
        let mut day = Weekday::Mon;
        for slot in header.iter_mut() {
            *slot = self.weekday_abbrev(day);
            day = day.succ();
        }
        header
    }

    pub fn month_name(&self, month: u32) -> &'static str {
        const EN: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        const RU: [&str; 12] = [
            "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август",
            "Сентябрь", "Октябрь", "Ноябрь", "Декабрь",
        ];
        let i = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::En => EN[i],
            Locale::Ru => RU[i],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCell {
    /// Placeholder before the first day so it lands in its weekday column.
    Blank,
    Day {
        date: NaiveDate,
        is_today: bool,
        is_selected: bool,
    },
}

impl DayCell {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DayCell::Blank => None,
            DayCell::Day { date, .. } => Some(*date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: YearMonth,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn leading_blanks(&self) -> usize {
        self.cells
            .iter()
            .take_while(|c| matches!(c, DayCell::Blank))
            .count()
    }

    pub fn day_count(&self) -> usize {
        self.cells.iter().filter(|c| c.date().is_some()).count()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.cells.iter().filter_map(DayCell::date)
    }

    /// Rows of seven cells; the last row may be short.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn today(&self) -> Option<NaiveDate> {
        self.cells.iter().find_map(|c| match c {
            DayCell::Day {
                date,
                is_today: true,
                ..
            } => Some(*date),
            _ => None,
        })
    }
}

/// Build the month grid for `month`. `today` is flagged only if it falls in
/// the rendered month.
pub fn month_grid(month: YearMonth, today: NaiveDate, selected: Option<NaiveDate>) -> MonthGrid {
    let first = month.first_day();
    let leading = first.weekday().num_days_from_monday() as usize;
    let days = month.days_in_month();

    let mut cells = Vec::with_capacity(leading + days as usize);
    cells.extend(std::iter::repeat(DayCell::Blank).take(leading));
    cells.extend((1..=days).filter_map(|d| month.day(d)).map(|date| DayCell::Day {
        date,
        is_today: date == today,
        is_selected: Some(date) == selected,
    }));

    MonthGrid { month, cells }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub label: &'static str,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekStrip {
    pub days: Vec<WeekDay>,
}

impl WeekStrip {
    pub fn start(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.iter().any(|d| d.date == date)
    }
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Monday-to-Sunday window containing `selected`.
pub fn week_strip(selected: NaiveDate, today: NaiveDate, locale: Locale) -> WeekStrip {
    let days = week_start(selected)
        .iter_days()
        .take(7)
        .map(|date| WeekDay {
            date,
            label: locale.weekday_abbrev(date.weekday()),
            is_today: date == today,
            is_selected: date == selected,
        })
        .collect();
    WeekStrip { days }
}
