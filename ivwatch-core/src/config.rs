//! Runtime configuration loaded from TOML.
//!
//! Every section is optional; a missing file means all defaults. Alert
//! thresholds are fixed policy and deliberately absent from this file.

use crate::data::{Lookback, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `telegram.bot_token`.
pub const ENV_BOT_TOKEN: &str = "IVWATCH_BOT_TOKEN";
/// Environment variable overriding `telegram.chat_id`.
pub const ENV_CHAT_ID: &str = "IVWATCH_CHAT_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub fetch: FetchConfig,
    pub history: HistoryConfig,
    pub telegram: TelegramConfig,
}

/// HTTP timeouts and retry schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout for every outbound call.
    pub timeout_secs: u64,
    /// Option-chain attempts per index per cycle.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff_ms: u64,
    /// Calendar days of daily bars to request.
    pub price_lookback_days: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_attempts: 3,
            backoff_ms: 500,
            price_lookback_days: 7,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms))
    }

    pub fn lookback(&self) -> Lookback {
        Lookback {
            days: self.price_lookback_days,
        }
    }
}

/// Whether the IV window survives process restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Window lives only as long as the process.
    #[default]
    Ephemeral,
    /// Window is loaded from and saved to `history.path` around each cycle.
    Persistent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub mode: HistoryMode,
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            mode: HistoryMode::Ephemeral,
            path: PathBuf::from("ivwatch_history.json"),
        }
    }
}

impl HistoryConfig {
    /// Whether the window is read from `path` at startup.
    pub fn loads_file(&self) -> bool {
        self.mode == HistoryMode::Persistent
    }

    /// Whether a cycle's window is written back to `path`. Dry runs never write.
    pub fn writes_file(&self, dry_run: bool) -> bool {
        self.loads_file() && !dry_run
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    /// Token and chat id, if both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => Some((token, chat)),
            _ => None,
        }
    }
}

impl WatchConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply environment overrides through a lookup function.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(ENV_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat) = lookup(ENV_CHAT_ID) {
            self.telegram.chat_id = Some(chat);
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch.timeout_secs must be > 0".into()));
        }
        if self.fetch.max_attempts == 0 {
            return Err(ConfigError::Invalid("fetch.max_attempts must be >= 1".into()));
        }
        if self.fetch.price_lookback_days < 2 {
            return Err(ConfigError::Invalid("fetch.price_lookback_days must be >= 2".into()));
        }
        Ok(())
    }
}
