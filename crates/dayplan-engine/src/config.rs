use std::time::Duration;

use dayplan_core::Locale;

pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(600);
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Timing and presentation knobs of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Hold time after which a press opens the context menu.
    pub long_press: Duration,
    /// How long a notice stays up before it is dismissed automatically.
    pub notice_ttl: Duration,
    pub locale: Locale,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            long_press: DEFAULT_LONG_PRESS,
            notice_ttl: DEFAULT_NOTICE_TTL,
            locale: Locale::default(),
        }
    }
}
