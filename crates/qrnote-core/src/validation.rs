//! Note content rules applied before any encoding or network work.

use thiserror::Error;

/// Maximum note text length, in characters.
pub const MAX_TEXT_CHARS: usize = 4096;
/// Maximum number of photos attached to one note.
pub const MAX_PHOTOS: usize = 5;

/// Reason a note was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter note text or add a photo")]
    EmptyNote,
    #[error("At most {max} photos are allowed ({count} selected)")]
    TooManyPhotos { count: usize, max: usize },
    #[error("Note text exceeds {max} characters ({length})")]
    TextTooLong { length: usize, max: usize },
}

impl ValidationError {
    /// Stable reason code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyNote => "empty_note",
            Self::TooManyPhotos { .. } => "too_many_photos",
            Self::TextTooLong { .. } => "text_too_long",
        }
    }
}

/// Content limits, tunable through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_text_chars: usize,
    pub max_photos: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_chars: MAX_TEXT_CHARS,
            max_photos: MAX_PHOTOS,
        }
    }
}

/// Validate note input against the default limits.
pub fn validate(text: &str, photo_count: usize) -> Result<(), ValidationError> {
    validate_with(text, photo_count, Limits::default())
}

/// Validate note input. Rules are checked in order and the first failure wins:
/// empty note, too many photos, text too long.
///
/// Text is trimmed before both the emptiness and the length check, and length
/// is counted in characters rather than bytes.
pub fn validate_with(text: &str, photo_count: usize, limits: Limits) -> Result<(), ValidationError> {
    let trimmed = text.trim();

    if trimmed.is_empty() && photo_count == 0 {
        return Err(ValidationError::EmptyNote);
    }

    if photo_count > limits.max_photos {
        return Err(ValidationError::TooManyPhotos {
            count: photo_count,
            max: limits.max_photos,
        });
    }

    let length = trimmed.chars().count();
    if length > limits.max_text_chars {
        return Err(ValidationError::TextTooLong {
            length,
            max: limits.max_text_chars,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_text_only() {
        assert_eq!(validate("hello", 0), Ok(()));
    }

    #[test]
    fn accepts_photos_only() {
        assert_eq!(validate("   ", 1), Ok(()));
    }

    #[test]
    fn rejects_whitespace_without_photos() {
        assert_eq!(validate(" \n\t ", 0), Err(ValidationError::EmptyNote));
        assert_eq!(validate("", 0), Err(ValidationError::EmptyNote));
    }

    #[test]
    fn rejects_six_photos() {
        assert_eq!(
            validate("hello", 6),
            Err(ValidationError::TooManyPhotos { count: 6, max: 5 })
        );
        assert_eq!(validate("hello", 5), Ok(()));
    }

    #[test]
    fn length_boundary_is_inclusive() {
        let at_limit = "a".repeat(MAX_TEXT_CHARS);
        let over_limit = "a".repeat(MAX_TEXT_CHARS + 1);
        assert_eq!(validate(&at_limit, 0), Ok(()));
        assert_eq!(
            validate(&over_limit, 0),
            Err(ValidationError::TextTooLong {
                length: MAX_TEXT_CHARS + 1,
                max: MAX_TEXT_CHARS
            })
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let cyrillic = "я".repeat(MAX_TEXT_CHARS);
        assert!(cyrillic.len() > MAX_TEXT_CHARS);
        assert_eq!(validate(&cyrillic, 0), Ok(()));
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        let padded = format!("  {}  ", "a".repeat(MAX_TEXT_CHARS));
        assert_eq!(validate(&padded, 0), Ok(()));
    }

    #[test]
    fn first_failure_wins() {
        // Empty note is reported before the photo cap.
        assert_eq!(validate("", 0), Err(ValidationError::EmptyNote));
        // Photo cap is reported before the text length.
        let long = "a".repeat(MAX_TEXT_CHARS + 1);
        assert_eq!(validate(&long, 7).unwrap_err().code(), "too_many_photos");
    }

    #[test]
    fn custom_limits_apply() {
        let limits = Limits {
            max_text_chars: 3,
            max_photos: 1,
        };
        assert!(validate_with("abcd", 0, limits).is_err());
        assert!(validate_with("abc", 2, limits).is_err());
        assert!(validate_with("abc", 1, limits).is_ok());
    }
}
