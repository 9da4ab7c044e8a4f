//! Note backend client for reference mode.
//!
//! The backend exposes two endpoints: `POST /create_note` (multipart
//! `text` + `photos`) answering `{ note_id, qr_url }`, and `POST /open_qr`
//! (`{ data }`) answering a renderable document. Failures carry `{ error }`.

use reqwest::multipart::{Form, Part};
use reqwest::{Request, StatusCode};
use serde::Deserialize;

use crate::models::{NoteId, Photo};
use crate::util::{compact_text, normalize_base_url};
use crate::{Error, Result};

/// Backend answer to a successful note creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedNote {
    pub note_id: NoteId,
    pub qr_url: String,
}

/// Server-side note storage.
pub trait NoteBackend {
    /// Store a note and return the URL to encode.
    async fn create_note(&self, text: &str, photos: &[Photo]) -> Result<CreatedNote>;

    /// Resolve scanned QR content into a renderable document.
    async fn open_qr(&self, data: &str) -> Result<String>;
}

/// HTTP client for the note backend.
#[derive(Debug, Clone)]
pub struct HttpNoteBackend {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpNoteBackend {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into().as_str()).map_err(Error::Config)?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| Error::Config(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { base_url, client })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_create_request(&self, text: &str, photos: &[Photo]) -> Result<Request> {
        let mut form = Form::new().text("text", text.to_string());
        for photo in photos {
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(&photo.content_type)
                .map_err(|error| {
                    Error::InvalidPhoto(format!("{}: {error}", photo.file_name))
                })?;
            form = form.part("photos", part);
        }

        self.client
            .post(format!("{}/create_note", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .build()
            .map_err(|error| Error::Transport(format!("Failed to build request: {error}")))
    }

    fn build_open_request(&self, data: &str) -> Result<Request> {
        self.client
            .post(format!("{}/open_qr", self.base_url))
            .json(&serde_json::json!({ "data": data }))
            .build()
            .map_err(|error| Error::Transport(format!("Failed to build request: {error}")))
    }

    /// Make a relative `qr_url` absolute against the backend base URL.
    fn absolute_url(&self, qr_url: &str) -> String {
        if qr_url.starts_with('/') {
            format!("{}{qr_url}", self.base_url)
        } else {
            qr_url.to_string()
        }
    }

    async fn execute(&self, request: Request, failure: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| Error::Transport(format!("Network error: {error}")))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status, &body, failure))
    }
}

impl NoteBackend for HttpNoteBackend {
    async fn create_note(&self, text: &str, photos: &[Photo]) -> Result<CreatedNote> {
        let request = self.build_create_request(text, photos)?;
        let response = self.execute(request, "Failed to create note").await?;
        let body = response
            .text()
            .await
            .map_err(|error| Error::Transport(format!("Network error: {error}")))?;
        let created = parse_created_note(&body)?;

        tracing::info!(
            note_id = %created.note_id,
            photos = photos.len(),
            "Backend stored note"
        );
        Ok(CreatedNote {
            qr_url: self.absolute_url(&created.qr_url),
            note_id: created.note_id,
        })
    }

    async fn open_qr(&self, data: &str) -> Result<String> {
        let request = self.build_open_request(data)?;
        let response = self.execute(request, "Failed to load note").await?;
        response
            .text()
            .await
            .map_err(|error| Error::Transport(format!("Network error: {error}")))
    }
}

fn parse_created_note(body: &str) -> Result<CreatedNote> {
    let created = serde_json::from_str::<CreatedNote>(body).map_err(|error| {
        Error::Transport(format!("Unexpected backend response: {error}"))
    })?;
    if created.qr_url.trim().is_empty() {
        return Err(Error::Transport(
            "Backend response did not include a QR URL".to_string(),
        ));
    }
    Ok(created)
}

/// Prefer the server's `{ error }` message; fall back to a generic one.
fn error_from_body(status: StatusCode, body: &str, failure: &str) -> Error {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) if !error.trim().is_empty() => Error::Transport(error),
        _ if body.trim().is_empty() => {
            Error::Transport(format!("{failure}: HTTP {}", status.as_u16()))
        }
        _ => Error::Transport(format!(
            "{failure}: HTTP {}: {}",
            status.as_u16(),
            compact_text(body)
        )),
    }
}
