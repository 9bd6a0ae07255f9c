//! Client configuration loaded from environment variables.
//!
//! Every knob has a default so a bare `ClientConfig::from_env()` talks to a
//! local development backend.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_NOTIFICATION_POLL_SECS: u64 = 30;
const DEFAULT_STATS_REFRESH_SECS: u64 = 300;
const TOKEN_DIR_NAME: &str = ".hotel-admin";
const TOKEN_FILE_NAME: &str = "tokens.json";

/// Runtime configuration shared by the pipeline and background tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without a trailing slash (e.g. `"http://127.0.0.1:8000/api"`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Where the file token store keeps the access/refresh pair.
    pub token_file: PathBuf,
    /// Interval between notification polls.
    pub notification_poll: Duration,
    /// Interval between dashboard statistics refreshes.
    pub stats_refresh: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            token_file: default_token_file(),
            notification_poll: Duration::from_secs(DEFAULT_NOTIFICATION_POLL_SECS),
            stats_refresh: Duration::from_secs(DEFAULT_STATS_REFRESH_SECS),
        }
    }
}

impl ClientConfig {
    /// Load from `HOTEL_API_BASE_URL`, `HOTEL_API_TIMEOUT_MS`, `HOTEL_TOKEN_FILE`,
    /// `HOTEL_NOTIFICATION_POLL_SECS` and `HOTEL_STATS_REFRESH_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("HOTEL_API_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let token_file = std::env::var("HOTEL_TOKEN_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(default_token_file, PathBuf::from);

        Self {
            base_url: normalize_base_url(&base_url),
            timeout: Duration::from_millis(env_parse_nonzero("HOTEL_API_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            token_file,
            notification_poll: Duration::from_secs(env_parse_nonzero(
                "HOTEL_NOTIFICATION_POLL_SECS",
                DEFAULT_NOTIFICATION_POLL_SECS,
            )),
            stats_refresh: Duration::from_secs(env_parse_nonzero(
                "HOTEL_STATS_REFRESH_SECS",
                DEFAULT_STATS_REFRESH_SECS,
            )),
        }
    }

    /// Replace the base URL, normalizing trailing slashes.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    /// Join an endpoint path such as `"/auth/login/"` onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Like [`env_parse`], but zero also falls back to `default`. Intervals and
/// timeouts must be non-zero.
pub(crate) fn env_parse_nonzero(key: &str, default: u64) -> u64 {
    match env_parse(key, default) {
        0 => {
            tracing::warn!(key, default, "zero is not allowed here; using default");
            default
        }
        value => value,
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn default_token_file() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(TOKEN_DIR_NAME).join(TOKEN_FILE_NAME)
}
