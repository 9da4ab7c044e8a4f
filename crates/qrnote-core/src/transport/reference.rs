//! Reference mode: upload the note, encode the returned URL.

use crate::config::TransportMode;
use crate::models::NoteDraft;
use crate::photos::{prepare_for_upload, CompressionOptions};
use crate::validation::{validate_with, Limits};
use crate::Result;

use super::backend::NoteBackend;
use super::{NoteTransport, QrTarget, ScanOutcome, Submission};

#[derive(Debug, Clone)]
pub struct ReferenceTransport<B> {
    backend: B,
    limits: Limits,
    compression: Option<CompressionOptions>,
}

impl<B> ReferenceTransport<B> {
    pub const fn new(backend: B, limits: Limits) -> Self {
        Self {
            backend,
            limits,
            compression: None,
        }
    }

    /// Re-encode photos before upload.
    #[must_use]
    pub const fn with_compression(mut self, options: CompressionOptions) -> Self {
        self.compression = Some(options);
        self
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: NoteBackend> NoteTransport for ReferenceTransport<B> {
    fn mode(&self) -> TransportMode {
        TransportMode::Reference
    }

    async fn submit(&self, draft: &NoteDraft) -> Result<Submission> {
        validate_with(&draft.text, draft.photo_count(), self.limits)?;

        let photos = match self.compression {
            Some(options) => prepare_for_upload(&draft.photos, options),
            None => draft.photos.clone(),
        };
        let created = self
            .backend
            .create_note(draft.trimmed_text(), &photos)
            .await?;

        Ok(Submission {
            note_id: created.note_id,
            target: QrTarget::Reference(created.qr_url),
        })
    }

    async fn resolve_scan(&self, raw: &str) -> Result<ScanOutcome> {
        let document = self.backend.open_qr(raw).await?;
        Ok(ScanOutcome::Resolved {
            raw: raw.to_string(),
            document,
        })
    }
}
