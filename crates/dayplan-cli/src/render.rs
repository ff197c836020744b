//! Plain-text views of the engine state.

use std::fmt::Write;

use chrono::{Datelike, NaiveDate};
use dayplan_core::{DayCell, Item, Locale, MonthGrid, Partition, WeekStrip};
use dayplan_engine::CalendarRender;

fn item_line(out: &mut String, item: &Item) {
    let mark = if item.completed { "x" } else { " " };
    let _ = write!(out, "  [{mark}] #{:<4} {}", item.id, item.title);
    if let Some(date) = item.date {
        let _ = write!(out, "  ({date})");
    }
    out.push('\n');
}

fn section(out: &mut String, heading: &str, items: &[Item]) {
    let _ = writeln!(out, "{heading}");
    if items.is_empty() {
        out.push_str("  (none)\n");
    }
    for item in items {
        item_line(out, item);
    }
}

/// The Today view: open tasks, then completed ones, then habits.
pub fn partition(p: &Partition) -> String {
    let mut out = String::new();
    section(&mut out, "Tasks", &p.active_tasks);
    if !p.completed_tasks.is_empty() {
        section(&mut out, "Completed", &p.completed_tasks);
    }
    out.push_str(&habits(p));
    out
}

pub fn habits(p: &Partition) -> String {
    let mut out = String::new();
    let heading = format!("Habits ({}/{} today)", p.habits_done(), p.habits.len());
    section(&mut out, &heading, &p.habits);
    out
}

/// Month grid with Monday-first columns. Today is starred and the selected
/// day bracketed.
pub fn month(grid: &MonthGrid, locale: Locale) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        locale.month_name(grid.month.month()),
        grid.month.year()
    );
    for label in locale.weekday_header() {
        let _ = write!(out, "{:<5}", label);
    }
    out.push('\n');
    for week in grid.weeks() {
        let row: String = week.iter().map(cell).collect();
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

fn cell(c: &DayCell) -> String {
    match *c {
        DayCell::Blank => "     ".to_string(),
        DayCell::Day {
            date,
            is_today,
            is_selected,
        } => {
            let star = if is_today { "*" } else { " " };
            if is_selected {
                format!("[{:>2}]{star}", date.day())
            } else {
                format!(" {:>2} {star}", date.day())
            }
        }
    }
}

pub fn week(strip: &WeekStrip) -> String {
    let days: Vec<String> = strip
        .days
        .iter()
        .map(|d| {
            let text = format!("{} {}", d.label, d.date.day());
            let text = if d.is_today { format!("{text}*") } else { text };
            if d.is_selected {
                format!("[{text}]")
            } else {
                text
            }
        })
        .collect();
    let mut out = days.join("  ");
    out.push('\n');
    out
}

pub fn calendar(render: &CalendarRender, locale: Locale) -> String {
    match render {
        CalendarRender::Month(grid) => month(grid, locale),
        CalendarRender::Week(strip) => week(strip),
    }
}

pub fn date_tasks(date: NaiveDate, tasks: &[Item]) -> String {
    let mut out = String::new();
    section(&mut out, &format!("Tasks on {date}"), tasks);
    out
}
