use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Telegram caps `sendMessage` text at this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub telegram_api_url: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_timeout: Duration,
    pub rate_limit_window: Duration,
    pub relay_rate_limit_per_window: u32,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("telegram_bot_token", &"[REDACTED]")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("telegram_timeout", &self.telegram_timeout)
            .field("rate_limit_window", &self.rate_limit_window)
            .field(
                "relay_rate_limit_per_window",
                &self.relay_rate_limit_per_window,
            )
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "QRNOTE_API_BIND_ADDR", "127.0.0.1:8080");

        let telegram_bot_token = required_trimmed(&lookup, "TELEGRAM_BOT_TOKEN")?;
        let telegram_chat_id = required_trimmed(&lookup, "TELEGRAM_CHAT_ID")?;

        let telegram_api_url = trim_trailing(&value_or_default(
            &lookup,
            "TELEGRAM_API_URL",
            "https://api.telegram.org",
        ))
        .to_string();
        if !is_http_url(&telegram_api_url) {
            return Err(ConfigError::Invalid(
                "TELEGRAM_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let telegram_timeout_secs = value_or_default(&lookup, "TELEGRAM_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid("TELEGRAM_TIMEOUT_SECS must be an integer in [1, 60]".to_string())
            })?;
        if !(1..=60).contains(&telegram_timeout_secs) {
            return Err(ConfigError::Invalid(
                "TELEGRAM_TIMEOUT_SECS must be in [1, 60]".to_string(),
            ));
        }

        let rate_limit_window_secs = value_or_default(&lookup, "RATE_LIMIT_WINDOW_SECS", "60")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "RATE_LIMIT_WINDOW_SECS must be an integer in [10, 3600]".to_string(),
                )
            })?;
        if !(10..=3_600).contains(&rate_limit_window_secs) {
            return Err(ConfigError::Invalid(
                "RATE_LIMIT_WINDOW_SECS must be in [10, 3600]".to_string(),
            ));
        }

        let relay_rate_limit_per_window =
            value_or_default(&lookup, "RELAY_RATE_LIMIT_PER_WINDOW", "20")
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::Invalid(
                        "RELAY_RATE_LIMIT_PER_WINDOW must be an integer in [1, 1000]".to_string(),
                    )
                })?;
        if !(1..=1_000).contains(&relay_rate_limit_per_window) {
            return Err(ConfigError::Invalid(
                "RELAY_RATE_LIMIT_PER_WINDOW must be in [1, 1000]".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            telegram_api_url,
            telegram_bot_token,
            telegram_chat_id,
            telegram_timeout: Duration::from_secs(telegram_timeout_secs),
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),
            relay_rate_limit_per_window,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn required_trimmed(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional_trimmed(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn trim_trailing(value: &str) -> &str {
    value.trim_end_matches('/')
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        telegram_api_url: "https://api.telegram.org".to_string(),
        telegram_bot_token: "123:secret-bot-token".to_string(),
        telegram_chat_id: "-1001".to_string(),
        telegram_timeout: Duration::from_secs(10),
        rate_limit_window: Duration::from_secs(60),
        relay_rate_limit_per_window: 2,
    }
}
