//! Status server configuration.
//!
//! DESIGN
//! ======
//! Read once at start-up from the process environment (after `.env` has
//! been loaded by `dotenvy`). Unset variables fall back to defaults; set but
//! malformed variables are an error rather than silently defaulted.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use console::net::synthetic::DEMO_TASK_ID;

pub const DEFAULT_PORT: u16 = 9001;
pub const DEFAULT_INTERVAL_MS: u64 = 3000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("STATUS_INTERVAL_MS must be greater than zero")]
    ZeroInterval,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Period between synthetic feed events.
    pub status_interval: Duration,
    /// Task id stamped on feed events.
    pub task_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            status_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            task_id: DEMO_TASK_ID.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `PORT` or `STATUS_INTERVAL_MS` is set but
    /// does not parse, or when the interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let interval_ms = parse_var(&lookup, "STATUS_INTERVAL_MS")?.unwrap_or(DEFAULT_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let task_id = lookup("STATUS_TASK_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.task_id);

        Ok(Self { port, status_interval: Duration::from_millis(interval_ms), task_id })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
