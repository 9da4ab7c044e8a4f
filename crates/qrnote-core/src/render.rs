//! QR image rendering.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

use crate::config::TransportMode;
use crate::models::NoteId;
use crate::{Error, Result};

/// Rendered QR code.
#[derive(Clone, PartialEq, Eq)]
pub struct QrImage {
    /// PNG-encoded image
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for QrImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrImage")
            .field("png_bytes", &self.png.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Turns a QR target string into an image.
pub trait QrRenderer {
    fn render(&self, target: &str) -> Result<QrImage>;
}

/// Renderer backed by the `qrcode` encoder.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeRenderer {
    size: u32,
    ec_level: EcLevel,
}

impl QrCodeRenderer {
    /// `size` is the minimum side of the output image in pixels.
    pub const fn new(size: u32) -> Self {
        Self {
            size,
            ec_level: EcLevel::L,
        }
    }
}

impl Default for QrCodeRenderer {
    fn default() -> Self {
        Self::new(256)
    }
}

impl QrRenderer for QrCodeRenderer {
    fn render(&self, target: &str) -> Result<QrImage> {
        if target.is_empty() {
            return Err(Error::Render("QR payload is empty".to_string()));
        }

        let code = QrCode::with_error_correction_level(target.as_bytes(), self.ec_level)
            .map_err(|error| Error::Render(error.to_string()))?;
        let image: GrayImage = code
            .render::<Luma<u8>>()
            .min_dimensions(self.size, self.size)
            .build();
        let (width, height) = image.dimensions();

        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|error| Error::Render(format!("Failed to encode PNG: {error}")))?;

        Ok(QrImage {
            png: cursor.into_inner(),
            width,
            height,
        })
    }
}

/// Deterministic download file name for a note's QR code.
///
/// Ids are percent-encoded outside `[A-Za-z0-9_-]`, so distinct ids never
/// share a file name and none can escape the output directory.
pub fn artifact_name(mode: TransportMode, note_id: &NoteId) -> String {
    let mut id = String::new();
    for byte in note_id.to_string().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            id.push(char::from(byte));
        } else {
            id.push_str(&format!("%{byte:02X}"));
        }
    }
    match mode {
        TransportMode::Inline => format!("qr-note-{id}.png"),
        TransportMode::Reference => format!("note-{id}.png"),
    }
}
