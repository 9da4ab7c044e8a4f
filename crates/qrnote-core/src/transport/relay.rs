//! Relay sink used by inline mode.
//!
//! The client never talks to the messaging provider directly. It posts
//! `{ note_id, text }` to the relay broker, which holds the credential and
//! answers `{ ok: true }` once the transcript has been delivered.

use serde::{Deserialize, Serialize};

use crate::models::NoteId;
use crate::util::{compact_text, normalize_base_url};
use crate::{Error, Result};

/// A note copy sent off-band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayMessage {
    pub note_id: NoteId,
    pub text: String,
}

/// Opaque "send text" collaborator.
pub trait RelaySink {
    /// Deliver a message; anything short of an acknowledgment is an error.
    async fn send(&self, message: &RelayMessage) -> Result<()>;
}

#[derive(Debug, Default, Deserialize)]
struct RelayAck {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the relay broker endpoint.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    url: String,
    client: reqwest::Client,
}

impl HttpRelayClient {
    /// `url` is the full relay endpoint, e.g. `https://relay.example.com/v1/relay`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = normalize_base_url(url.into().as_str()).map_err(Error::Config)?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| Error::Config(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_send_request(&self, message: &RelayMessage) -> Result<reqwest::Request> {
        self.client
            .post(&self.url)
            .json(message)
            .build()
            .map_err(|error| Error::Transport(format!("Failed to build relay request: {error}")))
    }
}

impl RelaySink for HttpRelayClient {
    async fn send(&self, message: &RelayMessage) -> Result<()> {
        let request = self.build_send_request(message)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| Error::Transport(format!("Relay unreachable: {error}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| Error::Transport(format!("Relay unreachable: {error}")))?;

        check_ack(status.as_u16(), &body)?;
        tracing::info!(note_id = %message.note_id, "Relayed note transcript");
        Ok(())
    }
}

fn check_ack(status: u16, body: &str) -> Result<()> {
    let ack = serde_json::from_str::<RelayAck>(body).unwrap_or_default();
    if (200..300).contains(&status) && ack.ok {
        return Ok(());
    }

    let reason = ack
        .error
        .filter(|error| !error.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {}", compact_text(body))
            }
        });
    Err(Error::Transport(format!("Relay rejected note: {reason}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_carries_id_and_text_only() {
        let client = HttpRelayClient::new("https://relay.example.com/v1/relay").unwrap();
        let request = client
            .build_send_request(&RelayMessage {
                note_id: NoteId::Timestamp(1_700_000_000_000),
                text: "hello".to_string(),
            })
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://relay.example.com/v1/relay");
        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, br#"{"note_id":1700000000000,"text":"hello"}"#);
    }

    #[test]
    fn acknowledgment_is_required() {
        assert!(check_ack(200, r#"{"ok":true}"#).is_ok());
        assert!(check_ack(200, r#"{"ok":false}"#).is_err());
        assert!(check_ack(200, "{}").is_err());
        assert!(check_ack(200, "").is_err());
    }

    #[test]
    fn broker_error_is_surfaced() {
        let error = check_ack(502, r#"{"error":"chat not found"}"#).unwrap_err();
        assert_eq!(error.user_message(), "Relay rejected note: chat not found");

        let error = check_ack(429, "").unwrap_err();
        assert_eq!(error.user_message(), "Relay rejected note: HTTP 429");
    }

    #[test]
    fn relay_url_must_be_http() {
        assert!(HttpRelayClient::new("relay.example.com").is_err());
    }
}
