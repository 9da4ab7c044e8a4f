//! Capture pipeline: draft in, QR artifact out.
//!
//! Validation, payload encoding and delivery happen inside the transport;
//! rendering only runs once the transport has succeeded.

use crate::config::TransportMode;
use crate::models::{NoteDraft, NoteId};
use crate::render::{artifact_name, QrImage, QrRenderer};
use crate::transport::{NoteTransport, QrTarget, ScanOutcome};
use crate::Result;

/// Everything a front end needs to show and save a new QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub note_id: NoteId,
    pub target: QrTarget,
    pub image: QrImage,
    /// Suggested download file name
    pub artifact_name: String,
}

#[derive(Debug, Clone)]
pub struct CapturePipeline<T, R> {
    transport: T,
    renderer: R,
}

impl<T: NoteTransport, R: QrRenderer> CapturePipeline<T, R> {
    pub const fn new(transport: T, renderer: R) -> Self {
        Self {
            transport,
            renderer,
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn mode(&self) -> TransportMode {
        self.transport.mode()
    }

    pub async fn capture(&self, draft: &NoteDraft) -> Result<CaptureResult> {
        let submission = self.transport.submit(draft).await?;
        let image = self.renderer.render(submission.target.as_str())?;
        let artifact_name = artifact_name(submission.target.mode(), &submission.note_id);

        tracing::info!(
            note_id = %submission.note_id,
            mode = %submission.target.mode(),
            artifact = %artifact_name,
            "Captured note"
        );
        Ok(CaptureResult {
            note_id: submission.note_id,
            target: submission.target,
            image,
            artifact_name,
        })
    }

    /// Hand scanned text to the transport for decoding or resolution.
    pub async fn resolve_scan(&self, raw: &str) -> Result<ScanOutcome> {
        self.transport.resolve_scan(raw).await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::codec::{encode_inline, ScanResult};
    use crate::transport::Submission;
    use crate::{Error, ErrorKind};

    struct FixedTransport {
        target: QrTarget,
    }

    impl NoteTransport for FixedTransport {
        fn mode(&self) -> TransportMode {
            self.target.mode()
        }

        async fn submit(&self, _draft: &NoteDraft) -> Result<Submission> {
            Ok(Submission {
                note_id: NoteId::Assigned("abc".to_string()),
                target: self.target.clone(),
            })
        }

        async fn resolve_scan(&self, raw: &str) -> Result<ScanOutcome> {
            Ok(ScanOutcome::Local(ScanResult::from_raw(raw)))
        }
    }

    struct FailingTransport;

    impl NoteTransport for FailingTransport {
        fn mode(&self) -> TransportMode {
            TransportMode::Inline
        }

        async fn submit(&self, _draft: &NoteDraft) -> Result<Submission> {
            Err(Error::Transport("Relay unreachable".to_string()))
        }

        async fn resolve_scan(&self, _raw: &str) -> Result<ScanOutcome> {
            Err(Error::Transport("Relay unreachable".to_string()))
        }
    }

    struct CountingRenderer<'a> {
        calls: &'a Cell<usize>,
        fail: bool,
    }

    impl QrRenderer for CountingRenderer<'_> {
        fn render(&self, _target: &str) -> Result<QrImage> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(Error::Render("data too long".to_string()));
            }
            Ok(QrImage {
                png: vec![0],
                width: 1,
                height: 1,
            })
        }
    }

    #[tokio::test]
    async fn reference_capture_names_artifact_after_note() {
        let calls = Cell::new(0);
        let pipeline = CapturePipeline::new(
            FixedTransport {
                target: QrTarget::Reference("https://notes.example.com/qr".to_string()),
            },
            CountingRenderer {
                calls: &calls,
                fail: false,
            },
        );

        let result = pipeline.capture(&NoteDraft::new("x")).await.unwrap();
        assert_eq!(result.artifact_name, "note-abc.png");
        assert_eq!(pipeline.mode(), TransportMode::Reference);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn transport_failure_skips_rendering() {
        let calls = Cell::new(0);
        let pipeline = CapturePipeline::new(
            FailingTransport,
            CountingRenderer {
                calls: &calls,
                fail: false,
            },
        );

        let error = pipeline.capture(&NoteDraft::new("x")).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn render_failure_is_distinct_from_transport() {
        let calls = Cell::new(0);
        let payload = encode_inline(&NoteId::Timestamp(1), "x", 350).unwrap();
        let pipeline = CapturePipeline::new(
            FixedTransport {
                target: QrTarget::Inline(payload),
            },
            CountingRenderer {
                calls: &calls,
                fail: true,
            },
        );

        let error = pipeline.capture(&NoteDraft::new("x")).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Render);
        assert_eq!(calls.get(), 1);
    }
}
