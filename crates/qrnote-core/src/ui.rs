//! Presentation state shared by front ends.
//!
//! Nothing here draws anything. Front ends read the flags and strings and
//! feed user gestures back in.

use std::time::{Duration, Instant};

use crate::util::ellipsize;
use crate::Error;

/// Character count above which the counter is highlighted.
pub const COUNTER_WARNING_THRESHOLD: usize = 4000;

/// Characters of decoded text shown in the scanner success line.
pub const SCANNER_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: Instant,
}

/// Transient message banner that hides itself after `timeout`.
#[derive(Debug, Clone)]
pub struct NoticeBanner {
    timeout: Duration,
    current: Option<Notice>,
}

impl NoticeBanner {
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            current: None,
        }
    }

    /// Replace whatever is showing.
    pub fn show(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            kind,
            message: message.into(),
            shown_at: now,
        });
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible(now).is_some()
    }

    /// The notice, if it has not timed out yet.
    pub fn visible(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.shown_at) < self.timeout)
    }
}

/// Live character counter under the text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharCounter {
    pub label: String,
    pub warning: bool,
}

pub fn char_counter(text: &str, max: usize) -> CharCounter {
    let length = text.chars().count();
    CharCounter {
        label: format!("{length} / {max}"),
        warning: length > COUNTER_WARNING_THRESHOLD,
    }
}

/// View state of the capture screen.
#[derive(Debug, Clone)]
pub struct AppView {
    pub scanner_open: bool,
    pub result_open: bool,
    pub banner: NoticeBanner,
    /// Status line inside the scanner modal
    pub scanner_line: Option<String>,
    /// Text field contents
    pub draft_text: String,
    /// Selected photo file names
    pub draft_photos: Vec<String>,
    pub submitting: bool,
}

impl AppView {
    pub const fn new(notice_timeout: Duration) -> Self {
        Self {
            scanner_open: false,
            result_open: false,
            banner: NoticeBanner::new(notice_timeout),
            scanner_line: None,
            draft_text: String::new(),
            draft_photos: Vec::new(),
            submitting: false,
        }
    }

    pub fn open_scanner(&mut self) {
        self.scanner_open = true;
        self.scanner_line = None;
    }

    pub fn close_scanner(&mut self) {
        self.scanner_open = false;
    }

    /// Escape closes every overlay at once.
    pub fn handle_escape(&mut self) {
        self.scanner_open = false;
        self.result_open = false;
        self.banner.dismiss();
    }

    pub fn report_error(&mut self, error: &Error, now: Instant) {
        self.banner
            .show(NoticeKind::Error, error.user_message(), now);
    }

    pub fn begin_submission(&mut self) {
        self.submitting = true;
    }

    /// Input survives failures so the user can fix it and retry.
    pub fn submission_finished<T>(&mut self, outcome: &Result<T, Error>, now: Instant) {
        self.submitting = false;
        match outcome {
            Ok(_) => {
                self.draft_text.clear();
                self.draft_photos.clear();
                self.result_open = true;
            }
            Err(error) => self.report_error(error, now),
        }
    }

    pub fn scanner_success_line(&mut self, decoded: &str) -> &str {
        let line = format!(
            "QR code recognized: {}",
            ellipsize(decoded, SCANNER_PREVIEW_CHARS)
        );
        self.scanner_line.insert(line)
    }

    pub fn counter(&self, max: usize) -> CharCounter {
        char_counter(&self.draft_text, max)
    }
}
