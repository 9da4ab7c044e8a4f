//! qrnote-core - Core library for QR Notes
//!
//! This crate contains the note model, the validation rules, the inline
//! payload codec, both transport modes, QR rendering and the scanner state
//! machine shared by every QR Notes interface (CLI and relay API).

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod photos;
pub mod pipeline;
pub mod render;
pub mod scanner;
pub mod transport;
pub mod ui;
pub mod util;
pub mod validation;

pub use error::{Error, ErrorKind, Result};
pub use models::{Note, NoteDraft, NoteId, Photo};
