//! Client configuration.
//!
//! One `ClientConfig` is resolved at startup and injected into the transport,
//! renderer and scanner. The transport mode is chosen here, once, rather than
//! per request.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_PAYLOAD_BUDGET;
use crate::util::{is_http_url, normalize_text_option};
use crate::validation::{Limits, MAX_PHOTOS, MAX_TEXT_CHARS};
use crate::{Error, Result};

pub const ENV_MODE: &str = "QRNOTE_MODE";
pub const ENV_API_BASE_URL: &str = "QRNOTE_API_BASE_URL";
pub const ENV_RELAY_URL: &str = "QRNOTE_RELAY_URL";
pub const ENV_PAYLOAD_BUDGET: &str = "QRNOTE_PAYLOAD_BUDGET";

/// Which kind of QR code notes are turned into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// QR carries the note text; a transcript is relayed off-band
    #[default]
    Inline,
    /// Note is uploaded; QR carries the backend URL
    Reference,
}

impl TransportMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "reference" => Ok(Self::Reference),
            other => Err(Error::Config(format!(
                "unknown mode '{other}' (expected 'inline' or 'reference')"
            ))),
        }
    }
}

/// Preferred camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Environment,
    User,
}

/// Highest sampling rate a config may request.
pub const MAX_SCANNER_FPS: u32 = 1_000;
const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Scanner sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Frames sampled per second
    pub fps: u32,
    /// Side of the square detection window in pixels; `None` scans whole frames
    pub window: Option<u32>,
    pub facing: Facing,
    /// Haptic pulse on a successful scan, in milliseconds
    pub vibrate_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            window: Some(250),
            facing: Facing::Environment,
            vibrate_ms: 200,
        }
    }
}

impl ScannerConfig {
    /// Delay between two sampled frames, never shorter than one millisecond
    pub fn frame_interval(&self) -> Duration {
        (Duration::from_secs(1) / self.fps.max(1)).max(MIN_FRAME_INTERVAL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub mode: TransportMode,
    /// Note backend base URL (reference mode)
    pub api_base_url: Option<String>,
    /// Relay endpoint (inline mode)
    pub relay_url: Option<String>,
    pub payload_budget: usize,
    pub max_text_chars: usize,
    pub max_photos: usize,
    pub scanner: ScannerConfig,
    pub notice_timeout_secs: u64,
    /// Side of the rendered QR image in pixels
    pub qr_size: u32,
    pub compress_photos: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Inline,
            api_base_url: None,
            relay_url: None,
            payload_budget: DEFAULT_PAYLOAD_BUDGET,
            max_text_chars: MAX_TEXT_CHARS,
            max_photos: MAX_PHOTOS,
            scanner: ScannerConfig::default(),
            notice_timeout_secs: 6,
            qr_size: 256,
            compress_photos: true,
        }
    }
}

impl ClientConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!("failed to parse {}: {error}", path.display()))
        })
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Apply `QRNOTE_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(mode) = normalize_text_option(lookup(ENV_MODE)) {
            self.mode = mode.parse()?;
        }
        if let Some(url) = normalize_text_option(lookup(ENV_API_BASE_URL)) {
            self.api_base_url = Some(url);
        }
        if let Some(url) = normalize_text_option(lookup(ENV_RELAY_URL)) {
            self.relay_url = Some(url);
        }
        if let Some(budget) = normalize_text_option(lookup(ENV_PAYLOAD_BUDGET)) {
            self.payload_budget = budget.parse().map_err(|_| {
                Error::Config(format!("{ENV_PAYLOAD_BUDGET} must be a positive integer"))
            })?;
        }
        Ok(self)
    }

    /// Check that the selected mode has the endpoint it needs.
    pub fn validate(&self) -> Result<()> {
        if self.payload_budget == 0 {
            return Err(Error::Config("payload_budget must be > 0".to_string()));
        }
        if self.max_text_chars == 0 {
            return Err(Error::Config("max_text_chars must be > 0".to_string()));
        }
        if !(1..=MAX_SCANNER_FPS).contains(&self.scanner.fps) {
            return Err(Error::Config(format!(
                "scanner.fps must be in [1, {MAX_SCANNER_FPS}]"
            )));
        }
        if self.qr_size == 0 {
            return Err(Error::Config("qr_size must be > 0".to_string()));
        }

        let (field, value) = match self.mode {
            TransportMode::Inline => ("relay_url", &self.relay_url),
            TransportMode::Reference => ("api_base_url", &self.api_base_url),
        };
        match normalize_text_option(value.clone()) {
            Some(url) if is_http_url(&url) => Ok(()),
            Some(_) => Err(Error::Config(format!(
                "{field} must include http:// or https://"
            ))),
            None => Err(Error::Config(format!(
                "{field} is required in {} mode",
                self.mode
            ))),
        }
    }

    pub const fn limits(&self) -> Limits {
        Limits {
            max_text_chars: self.max_text_chars,
            max_photos: self.max_photos,
        }
    }

    pub const fn notice_timeout(&self) -> Duration {
        Duration::from_secs(self.notice_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        |key| map.get(key).map(|value| (*value).to_string())
    }

    #[test]
    fn defaults_match_observed_design() {
        let config = ClientConfig::default();
        assert_eq!(config.mode, TransportMode::Inline);
        assert_eq!(config.payload_budget, 350);
        assert_eq!(config.max_text_chars, 4096);
        assert_eq!(config.max_photos, 5);
        assert_eq!(config.scanner.fps, 10);
        assert_eq!(config.scanner.window, Some(250));
        assert_eq!(config.notice_timeout(), Duration::from_secs(6));
        assert_eq!(config.scanner.frame_interval(), Duration::from_millis(100));
    }

    #[test]
    fn frame_interval_never_reaches_zero() {
        let fast = ScannerConfig {
            fps: 2_000,
            ..ScannerConfig::default()
        };
        assert_eq!(fast.frame_interval(), Duration::from_millis(1));

        let zero = ScannerConfig {
            fps: 0,
            ..ScannerConfig::default()
        };
        assert_eq!(zero.frame_interval(), Duration::from_secs(1));

        let config = ClientConfig {
            relay_url: Some("https://relay.example.com/v1/relay".to_string()),
            scanner: fast,
            ..ClientConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("scanner.fps"));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut map = HashMap::new();
        map.insert(ENV_MODE, "Reference");
        map.insert(ENV_API_BASE_URL, " https://notes.example.com ");
        map.insert(ENV_PAYLOAD_BUDGET, "500");

        let config = ClientConfig::default()
            .with_overrides(lookup_from(&map))
            .unwrap();
        assert_eq!(config.mode, TransportMode::Reference);
        assert_eq!(
            config.api_base_url.as_deref(),
            Some("https://notes.example.com")
        );
        assert_eq!(config.payload_budget, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let mut map = HashMap::new();
        map.insert(ENV_MODE, "carrier-pigeon");
        let error = ClientConfig::default()
            .with_overrides(lookup_from(&map))
            .unwrap_err();
        assert!(error.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn validate_requires_endpoint_for_mode() {
        let inline = ClientConfig::default();
        assert!(inline.validate().unwrap_err().to_string().contains("relay_url"));

        let reference = ClientConfig {
            mode: TransportMode::Reference,
            api_base_url: Some("notes.example.com".to_string()),
            ..ClientConfig::default()
        };
        assert!(reference
            .validate()
            .unwrap_err()
            .to_string()
            .contains("http://"));
    }

    #[test]
    fn file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        assert_eq!(ClientConfig::load_from_path(&path).unwrap(), ClientConfig::default());

        let config = ClientConfig {
            relay_url: Some("https://relay.example.com/v1/relay".to_string()),
            ..ClientConfig::default()
        };
        config.save_to_path(&path).unwrap();
        assert_eq!(ClientConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_uses_defaults_and_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{ "mode": "reference", "scanner": { "fps": 5 } }"#).unwrap();
        let config = ClientConfig::load_from_path(&path).unwrap();
        assert_eq!(config.mode, TransportMode::Reference);
        assert_eq!(config.scanner.fps, 5);
        assert_eq!(config.scanner.window, Some(250));

        std::fs::write(&path, r#"{ "bot_token": "secret" }"#).unwrap();
        let error = ClientConfig::load_from_path(&path).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }
}
