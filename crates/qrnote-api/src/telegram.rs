use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, TELEGRAM_MESSAGE_LIMIT};
use crate::error::AppError;

const TRANSCRIPT_TITLE: &str = "📝 New note";
const ELLIPSIS: char = '…';

/// Delivers note transcripts through the Bot API. The bot token never leaves
/// this process.
#[derive(Debug, Clone)]
pub struct TelegramRelay {
    client: reqwest::Client,
    config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramRelay {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.telegram_timeout)
            .build()
            .map_err(|error| {
                AppError::config(format!("Failed to construct HTTP client: {}", sanitize(&error)))
            })?;
        Ok(Self { client, config })
    }

    pub async fn deliver(&self, note_id: &str, text: &str) -> Result<(), AppError> {
        let transcript = format_transcript(note_id, text);
        let request = self.build_send_request(&transcript)?;

        let response = self.client.execute(request).await.map_err(|error| {
            AppError::external(format!(
                "Telegram request failed: {}",
                sanitize(&error.without_url())
            ))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        check_response(status, &body)
    }

    fn build_send_request(&self, transcript: &str) -> Result<reqwest::Request, AppError> {
        let payload = SendMessage {
            chat_id: &self.config.telegram_chat_id,
            text: transcript,
            parse_mode: "HTML",
        };
        self.client
            .post(self.send_message_url())
            .header("Accept", "application/json")
            .json(&payload)
            .build()
            .map_err(|error| {
                AppError::external(format!(
                    "Failed to build Telegram request: {}",
                    sanitize(&error.without_url())
                ))
            })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.telegram_api_url, self.config.telegram_bot_token
        )
    }
}

/// Render the chat message for a note: title, id, then the escaped body,
/// cut so the whole message fits in one Telegram message.
pub fn format_transcript(note_id: &str, text: &str) -> String {
    let mut transcript = format!(
        "{TRANSCRIPT_TITLE}\n\nID: <code>{}</code>\n\n",
        html_escape::encode_text(note_id)
    );
    let mut used = transcript.chars().count();

    let mut chars = text.chars().peekable();
    let mut buffer = [0; 4];
    while let Some(ch) = chars.next() {
        let piece: &str = ch.encode_utf8(&mut buffer);
        let escaped = html_escape::encode_text(piece);
        let width = escaped.chars().count();
        let reserve = usize::from(chars.peek().is_some());
        if used + width + reserve > TELEGRAM_MESSAGE_LIMIT {
            transcript.push(ELLIPSIS);
            break;
        }
        transcript.push_str(&escaped);
        used += width;
    }

    transcript
}

fn check_response(status: u16, body: &str) -> Result<(), AppError> {
    let parsed = serde_json::from_str::<TelegramResponse>(body).unwrap_or_default();
    if parsed.ok && (200..300).contains(&status) {
        return Ok(());
    }

    let reason = parsed
        .description
        .unwrap_or_else(|| format!("HTTP {status}: {}", compact_body(body)));
    tracing::warn!(status, reason = %reason, "Telegram rejected transcript");
    Err(AppError::external(format!("Telegram error: {reason}")))
}

fn sanitize(error: &impl std::fmt::Display) -> String {
    error.to_string().replace('\n', " ").trim().to_string()
}

fn compact_body(body: &str) -> String {
    body.trim().chars().take(180).collect()
}
