//! Inline mode: the QR code carries the note itself.

use crate::codec::{encode_inline, ScanResult};
use crate::config::TransportMode;
use crate::models::{Note, NoteDraft, NoteId};
use crate::validation::{validate_with, Limits};
use crate::{Error, Result};

use super::relay::{RelayMessage, RelaySink};
use super::{NoteTransport, QrTarget, ScanOutcome, Submission};

/// Encodes notes locally and relays a copy through `R`.
#[derive(Debug, Clone)]
pub struct InlineTransport<R> {
    relay: R,
    limits: Limits,
    budget: usize,
}

impl<R> InlineTransport<R> {
    pub const fn new(relay: R, limits: Limits, budget: usize) -> Self {
        Self {
            relay,
            limits,
            budget,
        }
    }

    pub const fn relay(&self) -> &R {
        &self.relay
    }
}

impl<R: RelaySink> NoteTransport for InlineTransport<R> {
    fn mode(&self) -> TransportMode {
        TransportMode::Inline
    }

    async fn submit(&self, draft: &NoteDraft) -> Result<Submission> {
        validate_with(&draft.text, draft.photo_count(), self.limits)?;
        if draft.photo_count() > 0 {
            return Err(Error::InlinePhotos {
                count: draft.photo_count(),
            });
        }

        let note = Note::from_draft(NoteId::generate(), draft);
        // Size check happens before anything leaves the device.
        let payload = encode_inline(&note.id, &note.text, self.budget)?;

        self.relay
            .send(&RelayMessage {
                note_id: note.id.clone(),
                text: note.text.clone(),
            })
            .await?;

        tracing::info!(
            note_id = %note.id,
            payload_chars = payload.char_len(),
            "Encoded inline note"
        );
        Ok(Submission {
            note_id: note.id,
            target: QrTarget::Inline(payload),
        })
    }

    async fn resolve_scan(&self, raw: &str) -> Result<ScanOutcome> {
        Ok(ScanOutcome::Local(ScanResult::from_raw(raw)))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codec::{decode, Decoded};
    use crate::models::Photo;
    use crate::validation::ValidationError;
    use crate::ErrorKind;

    #[derive(Default)]
    struct RecordingRelay {
        sent: RefCell<Vec<RelayMessage>>,
        fail: Cell<bool>,
    }

    impl RelaySink for RecordingRelay {
        async fn send(&self, message: &RelayMessage) -> Result<()> {
            self.sent.borrow_mut().push(message.clone());
            if self.fail.get() {
                return Err(Error::Transport("Relay unreachable".to_string()));
            }
            Ok(())
        }
    }

    fn transport(relay: RecordingRelay) -> InlineTransport<RecordingRelay> {
        InlineTransport::new(relay, Limits::default(), 350)
    }

    #[tokio::test]
    async fn submit_encodes_trimmed_text_and_relays_once() {
        let transport = transport(RecordingRelay::default());
        let submission = transport.submit(&NoteDraft::new("  hello \n")).await.unwrap();

        let QrTarget::Inline(payload) = &submission.target else {
            panic!("expected inline target");
        };
        assert_eq!(
            payload.as_str(),
            format!(r#"{{"id":{},"text":"hello"}}"#, submission.note_id)
        );
        match decode(payload.as_str()) {
            Decoded::Structured(note) => {
                assert_eq!(note.text, "hello");
                assert_eq!(note.id, Some(submission.note_id.clone()));
            }
            Decoded::RawText(raw) => panic!("expected structured payload, got {raw}"),
        }

        let sent = transport.relay().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "hello");
        assert_eq!(sent[0].note_id, submission.note_id);
    }

    #[tokio::test]
    async fn oversize_note_never_reaches_relay() {
        let transport = transport(RecordingRelay::default());
        let error = transport
            .submit(&NoteDraft::new("x".repeat(400)))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::PayloadTooLarge);
        assert!(transport.relay().sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn photos_are_rejected_without_relay() {
        let transport = transport(RecordingRelay::default());
        let draft = NoteDraft::new("hi").with_photos(vec![Photo::new("a.jpg", "image/jpeg", vec![1])]);
        let error = transport.submit(&draft).await.unwrap_err();

        assert!(matches!(error, Error::InlinePhotos { count: 1 }));
        assert!(transport.relay().sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn validation_runs_first() {
        let transport = transport(RecordingRelay::default());
        let error = transport.submit(&NoteDraft::new("   ")).await.unwrap_err();
        assert!(matches!(
            error,
            Error::Validation(ValidationError::EmptyNote)
        ));
        assert!(transport.relay().sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn relay_failure_is_surfaced_and_retry_gets_fresh_id() {
        let transport = transport(RecordingRelay {
            fail: Cell::new(true),
            ..RecordingRelay::default()
        });
        let draft = NoteDraft::new("retry me");
        let error = transport.submit(&draft).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);

        transport.relay().fail.set(false);
        let submission = transport.submit(&draft).await.unwrap();
        let sent = transport.relay().sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_ne!(sent[0].note_id, submission.note_id);
        assert_eq!(sent[1].note_id, submission.note_id);
    }

    #[tokio::test]
    async fn scans_are_decoded_locally() {
        let transport = transport(RecordingRelay::default());
        let outcome = transport.resolve_scan("plain words").await.unwrap();
        let ScanOutcome::Local(result) = outcome else {
            panic!("expected local decode");
        };
        assert_eq!(result.text(), "plain words");
        assert!(transport.relay().sent.borrow().is_empty());
    }
}
