//! HWID reset cooldown records.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Principal id -> Unix timestamp (seconds) of their last successful HWID reset.
pub type Cooldowns = BTreeMap<String, i64>;

/// Time left on a cooldown, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CooldownRemaining {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl From<Duration> for CooldownRemaining {
    fn from(remaining: Duration) -> Self {
        let total = remaining.as_secs();
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl From<&Duration> for CooldownRemaining {
    fn from(remaining: &Duration) -> Self {
        Self::from(*remaining)
    }
}

impl fmt::Display for CooldownRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hours, {} minutes, and {} seconds",
            self.hours, self.minutes, self.seconds
        )
    }
}
