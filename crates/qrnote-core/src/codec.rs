//! Inline payload codec.
//!
//! Inline QR codes carry the note itself as compact JSON, e.g.
//! `{"id":1700000000000,"text":"hello"}`. The encoded string must fit the
//! payload budget; anything longer is rejected before rendering or relaying.
//!
//! Decoding is total: content that does not parse as an inline note is
//! returned verbatim as opaque text.

use serde::{Deserialize, Serialize};

use crate::models::NoteId;
use crate::{Error, Result};

/// Maximum encoded inline payload length, in characters.
pub const DEFAULT_PAYLOAD_BUDGET: usize = 350;

/// A string ready to be embedded in a QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encoded length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct InlineWire<'a> {
    id: &'a NoteId,
    text: &'a str,
}

/// Serialize `{id, text}` and enforce the payload budget.
pub fn encode_inline(id: &NoteId, text: &str, budget: usize) -> Result<EncodedPayload> {
    let encoded = serde_json::to_string(&InlineWire { id, text })?;
    let length = encoded.chars().count();
    if length > budget {
        return Err(Error::PayloadTooLarge { length, budget });
    }
    Ok(EncodedPayload(encoded))
}

/// Note fields recovered from an inline payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructuredNote {
    #[serde(default)]
    pub id: Option<NoteId>,
    pub text: String,
}

/// Outcome of decoding scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The text was an inline note payload
    Structured(StructuredNote),
    /// Anything else, kept verbatim
    RawText(String),
}

/// Decode scanned text. Never fails.
pub fn decode(raw: &str) -> Decoded {
    serde_json::from_str::<StructuredNote>(raw)
        .map_or_else(|_| Decoded::RawText(raw.to_string()), Decoded::Structured)
}

/// A decoded QR code: the exact scanned text plus its interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub raw: String,
    pub content: Decoded,
}

impl ScanResult {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let content = decode(&raw);
        Self { raw, content }
    }

    /// Structured note fields, if the scan was an inline payload
    pub const fn structured(&self) -> Option<&StructuredNote> {
        match &self.content {
            Decoded::Structured(note) => Some(note),
            Decoded::RawText(_) => None,
        }
    }

    /// Unescaped text to show: the note text, or the raw content
    pub fn text(&self) -> &str {
        match &self.content {
            Decoded::Structured(note) => &note.text,
            Decoded::RawText(raw) => raw,
        }
    }

    /// Text escaped for insertion into an HTML display surface
    pub fn display_html(&self) -> String {
        escape_html(self.text()).replace('\n', "<br>")
    }
}

/// Escape text so scanned content cannot inject markup.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}
