//! Scan-and-decode state machine.
//!
//! ```text
//! Idle -> Starting -> Active -> Success | Failure -> Idle
//!   \________\__________\___________\______________-> Closed
//! ```
//!
//! A [`Scanner`] owns at most one [`ScannerSession`] at a time. The session
//! owns the camera stream and releases it when dropped, so every exit path
//! (success, failure, close, re-open) gives the camera back.

mod decoder;

use std::future::Future;
use std::time::Duration;

use image::{DynamicImage, GrayImage};
use tokio::time::{Interval, MissedTickBehavior};

use crate::config::{Facing, ScannerConfig};
use crate::{Error, Result};

pub use decoder::RqrrDecoder;

/// One captured greyscale frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub image: GrayImage,
}

impl Frame {
    pub const fn new(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        Self::new(image.to_luma8())
    }

    /// Decode an encoded image (PNG, JPEG, ...) into a frame.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        image::load_from_memory(bytes)
            .map(|image| Self::from_image(&image))
            .map_err(|error| Error::Capture(format!("Unreadable frame: {error}")))
    }
}

/// Live frames from an acquired camera.
pub trait FrameStream {
    /// Next frame, or `None` once the stream has ended.
    async fn next_frame(&mut self) -> Option<Frame>;

    /// Give the camera back.
    fn release(&mut self) -> Result<()>;
}

/// Exclusive capture device.
pub trait Camera {
    type Stream: FrameStream;

    async fn acquire(&mut self, facing: Facing) -> Result<Self::Stream>;
}

/// Per-frame QR detection.
pub trait FrameDecoder {
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// Best-effort tactile feedback.
pub trait Haptics {
    fn vibrate(&self, duration: Duration) -> Result<()>;
}

/// Haptics for devices without a vibration motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&self, _duration: Duration) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Starting,
    Active,
    /// Raw text of the decoded QR code
    Success(String),
    /// User-facing failure message
    Failure(String),
    Closed,
}

/// Capture state for one open/close cycle.
pub struct ScannerSession<S: FrameStream> {
    stream: S,
    frames_sampled: u64,
}

impl<S: FrameStream> ScannerSession<S> {
    const fn new(stream: S) -> Self {
        Self {
            stream,
            frames_sampled: 0,
        }
    }

    async fn next_sampled(&mut self, ticker: &mut Interval) -> Option<Frame> {
        ticker.tick().await;
        let frame = self.stream.next_frame().await?;
        self.frames_sampled += 1;
        Some(frame)
    }
}

impl<S: FrameStream> Drop for ScannerSession<S> {
    fn drop(&mut self) {
        match self.stream.release() {
            Ok(()) => tracing::debug!(frames = self.frames_sampled, "Camera released"),
            Err(error) => tracing::warn!(%error, "Failed to release camera"),
        }
    }
}

enum Step {
    Cancelled,
    StreamEnded,
    Decoded(String),
}

pub struct Scanner<C: Camera, D, H = NoHaptics> {
    camera: C,
    decoder: D,
    haptics: H,
    config: ScannerConfig,
    session: Option<ScannerSession<C::Stream>>,
    state: ScannerState,
}

impl<C: Camera, D: FrameDecoder> Scanner<C, D> {
    pub const fn new(camera: C, decoder: D, config: ScannerConfig) -> Self {
        Self {
            camera,
            decoder,
            haptics: NoHaptics,
            config,
            session: None,
            state: ScannerState::Idle,
        }
    }
}

impl<C: Camera, D: FrameDecoder, H: Haptics> Scanner<C, D, H> {
    pub fn with_haptics<H2: Haptics>(self, haptics: H2) -> Scanner<C, D, H2> {
        Scanner {
            camera: self.camera,
            decoder: self.decoder,
            haptics,
            config: self.config,
            session: self.session,
            state: self.state,
        }
    }

    pub const fn state(&self) -> &ScannerState {
        &self.state
    }

    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub const fn camera(&self) -> &C {
        &self.camera
    }

    /// Start a fresh capture session.
    ///
    /// Any previous session is torn down first, so at most one camera
    /// acquisition is ever live.
    pub async fn open(&mut self) -> Result<()> {
        self.session = None;
        self.state = ScannerState::Idle;

        self.state = ScannerState::Starting;
        tracing::debug!(facing = ?self.config.facing, "Acquiring camera");
        match self.camera.acquire(self.config.facing).await {
            Ok(stream) => {
                self.session = Some(ScannerSession::new(stream));
                self.state = ScannerState::Active;
                Ok(())
            }
            Err(error) => {
                let error = match error {
                    Error::Capture(_) => error,
                    other => Error::Capture(other.to_string()),
                };
                tracing::warn!(%error, "Camera acquisition failed");
                self.state = ScannerState::Failure(error.user_message());
                Err(error)
            }
        }
    }

    /// Sample frames until a QR code is decoded or `cancel` completes.
    ///
    /// Returns the raw decoded text, or `None` when cancelled (the scanner is
    /// then closed). Frames without a readable code are skipped.
    pub async fn scan<F>(&mut self, cancel: F) -> Result<Option<String>>
    where
        F: Future<Output = ()>,
    {
        let Some(session) = self.session.as_mut() else {
            return Err(Error::Capture("Scanner is not active".to_string()));
        };

        let mut ticker = tokio::time::interval(self.config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(cancel);

        let step = loop {
            tokio::select! {
                biased;
                () = &mut cancel => break Step::Cancelled,
                frame = session.next_sampled(&mut ticker) => match frame {
                    None => break Step::StreamEnded,
                    Some(frame) => match self.decoder.decode(&frame) {
                        Some(raw) => break Step::Decoded(raw),
                        None => tracing::trace!(frame = session.frames_sampled, "No QR code in frame"),
                    },
                },
            }
        };

        match step {
            Step::Cancelled => {
                self.close();
                Ok(None)
            }
            Step::StreamEnded => {
                self.session = None;
                let message = "Camera stopped producing frames".to_string();
                self.state = ScannerState::Failure(message.clone());
                Err(Error::Capture(message))
            }
            Step::Decoded(raw) => {
                let pulse = Duration::from_millis(self.config.vibrate_ms);
                if let Err(error) = self.haptics.vibrate(pulse) {
                    tracing::debug!(%error, "Haptic feedback unavailable");
                }
                self.session = None;
                tracing::info!(chars = raw.chars().count(), "Scanned QR code");
                self.state = ScannerState::Success(raw.clone());
                Ok(Some(raw))
            }
        }
    }

    /// Stop capturing from any state and release the camera.
    pub fn close(&mut self) {
        self.session = None;
        self.state = ScannerState::Closed;
    }
}
