use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dayplan_core::{HostUser, ItemId, ItemKind, Locale, UserId, UserIdentity};
use dayplan_engine::EngineConfig;
use dayplan_service::HttpService;

#[derive(Debug, Parser)]
#[command(name = "dayplan", about = "Tasks, habits and a day calendar")]
pub struct CliConfig {
    /// Server URL
    #[arg(long, env = "DAYPLAN_SERVER_URL", default_value = "http://127.0.0.1:8000")]
    pub server_url: String,

    /// Chat user id. Without one the shared test account is used.
    #[arg(long, env = "DAYPLAN_USER_ID")]
    pub user_id: Option<UserId>,

    /// Display name sent on registration
    #[arg(long, env = "DAYPLAN_USER_NAME")]
    pub user_name: Option<String>,

    /// Delay before retrying a request that failed to reach the server (milliseconds)
    #[arg(long, env = "DAYPLAN_RETRY_DELAY_MS", default_value = "2500")]
    pub retry_delay_ms: u64,

    /// Language of weekday and month names (en, ru)
    #[arg(long, env = "DAYPLAN_LOCALE", default_value = "en", value_parser = parse_locale)]
    pub locale: Locale,

    /// Work against an in-memory store instead of the server
    #[arg(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Open and completed tasks plus today's habits
    List,
    /// Habits only
    Habits,
    /// Add a task or habit
    Add {
        #[arg(value_parser = parse_kind)]
        kind: ItemKind,
        title: String,
        /// Schedule the task on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Flip completion of an item
    Toggle {
        #[arg(value_parser = parse_kind)]
        kind: ItemKind,
        id: ItemId,
    },
    /// Rename an item
    Edit {
        #[arg(value_parser = parse_kind)]
        kind: ItemKind,
        id: ItemId,
        title: String,
    },
    /// Delete an item
    Delete {
        #[arg(value_parser = parse_kind)]
        kind: ItemKind,
        id: ItemId,
    },
    /// Week strip around a date with its tasks, or the month grid
    Calendar {
        /// Day to select (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Show the whole month instead of one week
        #[arg(long)]
        month: bool,
    },
}

fn parse_kind(s: &str) -> Result<ItemKind, String> {
    ItemKind::from_str(s).ok_or_else(|| format!("unknown item kind '{s}', expected task or habit"))
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    Locale::from_str(s).ok_or_else(|| format!("unknown locale '{s}', expected en or ru"))
}

impl CliConfig {
    /// The user the session acts as. A missing id selects test mode.
    pub fn identity(&self) -> UserIdentity {
        let host = self.user_id.map(|id| HostUser {
            id,
            username: self.user_name.clone(),
            first_name: None,
        });
        UserIdentity::from_host(host)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// HTTP client for `server_url`, retrying after the configured delay.
    pub fn http_service(&self) -> HttpService {
        HttpService::new(&self.server_url).with_retry_delay(self.retry_delay())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            locale: self.locale,
            ..EngineConfig::default()
        }
    }
}
