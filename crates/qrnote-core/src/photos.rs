//! Photo intake: concurrent file loading and upload compression.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba};
use tokio::task::JoinSet;

use crate::models::Photo;
use crate::validation::MAX_PHOTOS;
use crate::{Error, Result};

/// Settings for re-encoding photos before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Longest allowed side in pixels.
    pub max_dimension: u32,
    /// JPEG quality.
    pub jpeg_quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1600,
            jpeg_quality: 80,
        }
    }
}

/// The files shown in the preview strip: at most the first five.
pub fn preview_paths(paths: &[PathBuf]) -> &[PathBuf] {
    &paths[..paths.len().min(MAX_PHOTOS)]
}

/// Read photo files concurrently.
///
/// Reads complete in any order; the result is put back into input order.
pub async fn load_photos(paths: &[PathBuf]) -> Result<Vec<Photo>> {
    let mut tasks = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        tasks.spawn(async move {
            let bytes = tokio::fs::read(&path).await;
            (index, path, bytes)
        });
    }

    let mut loaded: Vec<Option<Photo>> = vec![None; paths.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, path, bytes) = joined.map_err(|error| Error::Io(std::io::Error::other(error)))?;
        let bytes = bytes?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Loaded photo");
        loaded[index] = Some(photo_from_bytes(&path, bytes)?);
    }

    Ok(loaded.into_iter().flatten().collect())
}

fn photo_from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Photo> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo")
        .to_string();
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| Error::InvalidPhoto(format!("{file_name}: unknown file type")))?;

    let photo = Photo::new(file_name, content_type, bytes);
    if !photo.is_image() {
        return Err(Error::InvalidPhoto(format!(
            "{}: {} is not an image",
            photo.file_name, photo.content_type
        )));
    }
    Ok(photo)
}

/// Re-encode a photo as JPEG, downscaled to fit `max_dimension`.
///
/// Aspect ratio is preserved and small images are not upscaled. Transparent
/// pixels are flattened onto white.
pub fn compress_photo(photo: &Photo, options: CompressionOptions) -> Result<Photo> {
    if photo.bytes.is_empty() {
        return Err(Error::InvalidPhoto(format!("{}: file is empty", photo.file_name)));
    }
    if options.max_dimension == 0 {
        return Err(Error::InvalidPhoto(
            "max dimension must be greater than zero".to_string(),
        ));
    }

    let source = image::load_from_memory(&photo.bytes).map_err(|error| {
        Error::InvalidPhoto(format!("{}: failed to decode image: {error}", photo.file_name))
    })?;

    let (width, height) = source.dimensions();
    let resized = if width <= options.max_dimension && height <= options.max_dimension {
        source
    } else {
        source.resize(options.max_dimension, options.max_dimension, FilterType::Lanczos3)
    };
    let rgb = flatten_onto_white(&resized);

    let mut cursor = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut cursor, options.jpeg_quality)
        .encode_image(&rgb)
        .map_err(|error| {
            Error::InvalidPhoto(format!("{}: failed to encode JPEG: {error}", photo.file_name))
        })?;

    let file_name = Path::new(&photo.file_name)
        .with_extension("jpg")
        .to_string_lossy()
        .into_owned();
    Ok(Photo::new(file_name, "image/jpeg", cursor.into_inner()))
}

/// Compress every photo, keeping the original when compression fails.
pub fn prepare_for_upload(photos: &[Photo], options: CompressionOptions) -> Vec<Photo> {
    photos
        .iter()
        .map(|photo| match compress_photo(photo, options) {
            Ok(compressed) => compressed,
            Err(error) => {
                tracing::warn!(file = %photo.file_name, %error, "Sending photo uncompressed");
                photo.clone()
            }
        })
        .collect()
}

fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(a);
        let blend = |channel: u8| {
            let value = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            u8::try_from(value).unwrap_or(u8::MAX)
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
