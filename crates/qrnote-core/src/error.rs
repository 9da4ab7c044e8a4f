//! Error types for qrnote-core

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using qrnote-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in qrnote-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Note input violates the content constraints
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Inline payload does not fit into a single QR code
    #[error("Encoded note is {length} characters, the QR payload limit is {budget}")]
    PayloadTooLarge { length: usize, budget: usize },

    /// Photos were attached to a note in inline mode
    #[error("{count} photo(s) attached, but inline QR codes cannot carry photos")]
    InlinePhotos { count: usize },

    /// A selected file cannot be attached as a photo
    #[error("Invalid photo: {0}")]
    InvalidPhoto(String),

    /// Backend or relay failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// QR generation failed for a payload that passed validation
    #[error("Render error: {0}")]
    Render(String),

    /// Camera could not be acquired or stopped producing frames
    #[error("Capture error: {0}")]
    Capture(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification used to pick the user-facing feedback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    PayloadTooLarge,
    Transport,
    Render,
    Capture,
    Internal,
}

impl Error {
    /// Classifies this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidPhoto(_) => ErrorKind::Validation,
            Self::PayloadTooLarge { .. } | Self::InlinePhotos { .. } => ErrorKind::PayloadTooLarge,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Render(_) => ErrorKind::Render,
            Self::Capture(_) => ErrorKind::Capture,
            Self::Config(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Whether the user can recover by editing input or retrying.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }

    /// Message shown in the notice banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(reason) => reason.to_string(),
            Self::PayloadTooLarge { .. } => {
                "Note is too long for a single QR code. Shorten the text.".to_string()
            }
            Self::InlinePhotos { .. } => {
                "Photos cannot be embedded in a self-contained QR code. Remove them or switch to reference mode."
                    .to_string()
            }
            Self::InvalidPhoto(message) => format!("Cannot attach photo: {message}"),
            Self::Transport(message) => message.clone(),
            Self::Render(message) => format!("Failed to generate QR code: {message}"),
            Self::Capture(_) => {
                "Could not start the camera. Check camera permissions.".to_string()
            }
            Self::Config(message) => format!("Configuration error: {message}"),
            Self::Io(error) => format!("File error: {error}"),
            Self::Serialization(error) => format!("Unexpected data: {error}"),
        }
    }
}
