//! Data models for QR Notes

mod note;
mod photo;

pub use note::{Note, NoteDraft, NoteId};
pub use photo::Photo;
