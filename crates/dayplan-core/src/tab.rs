use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level view of the mini-app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabState {
    #[default]
    Today,
    Habits,
    Calendar,
}

impl TabState {
    pub const ALL: &[TabState] = &[TabState::Today, TabState::Habits, TabState::Calendar];

    pub fn as_str(&self) -> &'static str {
        match self {
            TabState::Today => "today",
            TabState::Habits => "habits",
            TabState::Calendar => "calendar",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TabState::Today => "Today",
            TabState::Habits => "Habits",
            TabState::Calendar => "Calendar",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "today" | "tasks" => Some(TabState::Today),
            "habits" => Some(TabState::Habits),
            "calendar" => Some(TabState::Calendar),
            _ => None,
        }
    }
}

impl fmt::Display for TabState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
