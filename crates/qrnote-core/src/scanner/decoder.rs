use image::GrayImage;

use crate::config::ScannerConfig;

use super::{Frame, FrameDecoder};

/// QR decoder backed by `rqrr`.
///
/// Only the centered detection window of each frame is searched; a frame
/// smaller than the window is searched whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder {
    window: Option<u32>,
}

impl RqrrDecoder {
    pub const fn new(window: Option<u32>) -> Self {
        Self { window }
    }

    pub const fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.window)
    }

    fn bounds(&self, image: &GrayImage) -> (u32, u32, u32, u32) {
        let (width, height) = image.dimensions();
        match self.window {
            Some(side) if side > 0 => {
                let w = side.min(width);
                let h = side.min(height);
                ((width - w) / 2, (height - h) / 2, w, h)
            }
            _ => (0, 0, width, height),
        }
    }
}

impl FrameDecoder for RqrrDecoder {
    // Pixel coordinates never exceed the u32 frame bounds.
    #[allow(clippy::cast_possible_truncation)]
    fn decode(&self, frame: &Frame) -> Option<String> {
        let image = &frame.image;
        let (left, top, width, height) = self.bounds(image);
        if width == 0 || height == 0 {
            return None;
        }

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| image.get_pixel(left + x as u32, top + y as u32).0[0],
        );

        prepared
            .detect_grids()
            .into_iter()
            .find_map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(content),
                Err(error) => {
                    tracing::trace!(?error, "Grid found but not decodable");
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::render::{QrCodeRenderer, QrRenderer};

    fn rendered_frame(payload: &str) -> Frame {
        let image = QrCodeRenderer::new(240).render(payload).unwrap();
        Frame::from_encoded(&image.png).unwrap()
    }

    #[test]
    fn decodes_rendered_qr_code() {
        let frame = rendered_frame(r#"{"id":1,"text":"hello"}"#);
        let decoded = RqrrDecoder::new(None).decode(&frame);
        assert_eq!(decoded.as_deref(), Some(r#"{"id":1,"text":"hello"}"#));
    }

    #[test]
    fn blank_frame_yields_nothing() {
        let frame = Frame::new(GrayImage::from_pixel(64, 64, Luma([255])));
        assert_eq!(RqrrDecoder::new(Some(250)).decode(&frame), None);
    }

    #[test]
    fn window_is_centered_and_clamped() {
        let decoder = RqrrDecoder::new(Some(250));
        assert_eq!(decoder.bounds(&GrayImage::new(640, 480)), (195, 115, 250, 250));
        assert_eq!(decoder.bounds(&GrayImage::new(200, 100)), (0, 0, 200, 100));
        assert_eq!(
            RqrrDecoder::new(None).bounds(&GrayImage::new(640, 480)),
            (0, 0, 640, 480)
        );
    }
}
