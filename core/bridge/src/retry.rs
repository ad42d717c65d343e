use serde::Deserialize;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_LOGOUT_PAUSE_MS: u64 = 500;
const DEFAULT_SETTLE_PAUSE_MS: u64 = 1000;

/// Reconnect schedule used when publishing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total publish attempts for one notification, including the first.
    pub max_attempts: u32,
    /// Pause between logout and re-login.
    pub logout_pause: Duration,
    /// Pause after re-login before publishing again.
    pub settle_pause: Duration,
}

impl RetryPolicy {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            logout_pause: Duration::ZERO,
            settle_pause: Duration::ZERO,
        }
    }

    pub fn allows_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            logout_pause: Duration::from_millis(DEFAULT_LOGOUT_PAUSE_MS),
            settle_pause: Duration::from_millis(DEFAULT_SETTLE_PAUSE_MS),
        }
    }
}

/// `[retry]` table of the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_logout_pause_ms")]
    pub logout_pause_ms: u64,
    #[serde(default = "default_settle_pause_ms")]
    pub settle_pause_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            logout_pause_ms: DEFAULT_LOGOUT_PAUSE_MS,
            settle_pause_ms: DEFAULT_SETTLE_PAUSE_MS,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            logout_pause: Duration::from_millis(config.logout_pause_ms),
            settle_pause: Duration::from_millis(config.settle_pause_ms),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_logout_pause_ms() -> u64 {
    DEFAULT_LOGOUT_PAUSE_MS
}

fn default_settle_pause_ms() -> u64 {
    DEFAULT_SETTLE_PAUSE_MS
}
