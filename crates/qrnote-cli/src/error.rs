use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] qrnote_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Config file already exists at {}. Pass --force to replace it.", .0.display())]
    ConfigExists(PathBuf),
    #[error("No QR code found in the given images")]
    NoQrCode,
}

impl CliError {
    /// Text printed after `Error: `.
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}
