//! Transport adapters.
//!
//! A transport turns a validated draft into the string a QR code should
//! carry, and turns scanned QR content back into something displayable.
//! Two variants exist:
//!
//! - [`InlineTransport`] encodes the note into the QR code and relays a copy
//!   through a [`RelaySink`].
//! - [`ReferenceTransport`] uploads the note to a [`NoteBackend`] and encodes
//!   the URL it returns.
//!
//! The variant is picked once from [`ClientConfig`] via
//! [`ConfiguredTransport::from_config`].

mod backend;
mod inline;
mod reference;
mod relay;

pub use backend::{CreatedNote, HttpNoteBackend, NoteBackend};
pub use inline::InlineTransport;
pub use reference::ReferenceTransport;
pub use relay::{HttpRelayClient, RelayMessage, RelaySink};

use crate::codec::{EncodedPayload, ScanResult};
use crate::config::{ClientConfig, TransportMode};
use crate::models::{NoteDraft, NoteId};
use crate::photos::CompressionOptions;
use crate::{Error, Result};

/// What the QR code for a submitted note carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrTarget {
    /// Self-contained `{"id":..,"text":..}` payload
    Inline(EncodedPayload),
    /// Backend URL
    Reference(String),
}

impl QrTarget {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline(payload) => payload.as_str(),
            Self::Reference(url) => url,
        }
    }

    pub const fn mode(&self) -> TransportMode {
        match self {
            Self::Inline(_) => TransportMode::Inline,
            Self::Reference(_) => TransportMode::Reference,
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub note_id: NoteId,
    pub target: QrTarget,
}

/// What a scanned QR code turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Decoded on the device
    Local(ScanResult),
    /// Document returned by the backend for the scanned data
    Resolved { raw: String, document: String },
}

impl ScanOutcome {
    pub fn raw(&self) -> &str {
        match self {
            Self::Local(result) => &result.raw,
            Self::Resolved { raw, .. } => raw,
        }
    }
}

pub trait NoteTransport {
    fn mode(&self) -> TransportMode;

    /// Validate and deliver a draft, returning what to encode.
    async fn submit(&self, draft: &NoteDraft) -> Result<Submission>;

    /// Turn scanned QR content into a displayable outcome.
    async fn resolve_scan(&self, raw: &str) -> Result<ScanOutcome>;
}

/// Transport selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredTransport {
    Inline(InlineTransport<HttpRelayClient>),
    Reference(ReferenceTransport<HttpNoteBackend>),
}

impl ConfiguredTransport {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        match config.mode {
            TransportMode::Inline => {
                let url = required(config.relay_url.as_deref(), "relay_url")?;
                let relay = HttpRelayClient::new(url)?;
                Ok(Self::Inline(InlineTransport::new(
                    relay,
                    config.limits(),
                    config.payload_budget,
                )))
            }
            TransportMode::Reference => {
                let url = required(config.api_base_url.as_deref(), "api_base_url")?;
                let mut transport =
                    ReferenceTransport::new(HttpNoteBackend::new(url)?, config.limits());
                if config.compress_photos {
                    transport = transport.with_compression(CompressionOptions::default());
                }
                Ok(Self::Reference(transport))
            }
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value.ok_or_else(|| Error::Config(format!("{field} is not configured")))
}

impl NoteTransport for ConfiguredTransport {
    fn mode(&self) -> TransportMode {
        match self {
            Self::Inline(transport) => transport.mode(),
            Self::Reference(transport) => transport.mode(),
        }
    }

    async fn submit(&self, draft: &NoteDraft) -> Result<Submission> {
        match self {
            Self::Inline(transport) => transport.submit(draft).await,
            Self::Reference(transport) => transport.submit(draft).await,
        }
    }

    async fn resolve_scan(&self, raw: &str) -> Result<ScanOutcome> {
        match self {
            Self::Inline(transport) => transport.resolve_scan(raw).await,
            Self::Reference(transport) => transport.resolve_scan(raw).await,
        }
    }
}
