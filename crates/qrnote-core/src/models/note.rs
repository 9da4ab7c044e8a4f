//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use super::photo::Photo;

static LAST_GENERATED_MS: AtomicI64 = AtomicI64::new(0);

/// Identifier of a note.
///
/// Notes created locally (inline mode) get a millisecond timestamp; notes
/// created by the backend (reference mode) carry whatever id the server
/// assigned. The timestamp form serializes as a JSON number so the inline
/// payload stays compact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    /// Unix milliseconds, strictly increasing within a process
    Timestamp(i64),
    /// Server-assigned identifier
    Assigned(String),
}

impl NoteId {
    /// Generate a new time-derived id.
    ///
    /// Ids are strictly monotonic: two calls within the same millisecond
    /// still yield distinct values.
    #[must_use]
    pub fn generate() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = LAST_GENERATED_MS.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_GENERATED_MS.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self::Timestamp(next),
                Err(actual) => last = actual,
            }
        }
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp(ms) => write!(f, "{ms}"),
            Self::Assigned(id) => f.write_str(id),
        }
    }
}

/// User input for a note that has not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    /// Text exactly as typed
    pub text: String,
    /// Attached photos, in selection order
    pub photos: Vec<Photo>,
}

impl NoteDraft {
    /// Create a text-only draft
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            photos: Vec::new(),
        }
    }

    /// Attach photos to the draft
    #[must_use]
    pub fn with_photos(mut self, photos: Vec<Photo>) -> Self {
        self.photos = photos;
        self
    }

    /// Text with surrounding whitespace removed
    #[must_use]
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Number of attached photos
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }
}

/// A note that has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Trimmed text content
    pub text: String,
    /// Attached photos (reference mode only)
    pub photos: Vec<Photo>,
}

impl Note {
    /// Build a note from a draft, trimming its text
    #[must_use]
    pub fn from_draft(id: NoteId, draft: &NoteDraft) -> Self {
        Self {
            id,
            text: draft.trimmed_text().to_string(),
            photos: draft.photos.clone(),
        }
    }
}
