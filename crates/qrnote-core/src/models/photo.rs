//! Photo attachment model

use serde::{Deserialize, Serialize};

/// An image blob attached to a note.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// File name sent with the multipart part
    pub file_name: String,
    /// Content MIME type
    pub content_type: String,
    /// Raw image bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Photo {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Check if the content type is an image type
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_omits_bytes() {
        let photo = Photo::new("a.jpg", "image/jpeg", vec![1, 2, 3]);
        let debug = format!("{photo:?}");
        assert!(debug.contains("size_bytes: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }

    #[test]
    fn is_image_checks_mime_prefix() {
        assert!(Photo::new("a.png", "image/png", Vec::new()).is_image());
        assert!(!Photo::new("a.txt", "text/plain", Vec::new()).is_image());
    }
}
