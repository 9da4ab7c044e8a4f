use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::rate_limit::{RateLimitMetricsSnapshot, RelayRateLimiter};
use crate::telegram::TelegramRelay;

/// Longest note body the relay accepts, matching the client-side limit.
const MAX_NOTE_CHARS: usize = 4096;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    telegram: Arc<TelegramRelay>,
    rate_limiter: Arc<RelayRateLimiter>,
}

impl AppState {
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, AppError> {
        Ok(Self {
            telegram: Arc::new(TelegramRelay::new(config.clone())?),
            rate_limiter: Arc::new(RelayRateLimiter::from_config(config.as_ref())),
            config,
        })
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/relay", post(relay_note))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    rate_limit: RateLimitMetricsSnapshot,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
        rate_limit: state.rate_limiter.metrics_snapshot().await,
    })
}

#[derive(Debug, Deserialize)]
struct RelayRequest {
    note_id: Value,
    text: String,
}

#[derive(Debug, Serialize)]
struct RelayResponse {
    ok: bool,
}

async fn relay_note(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayResponse>, AppError> {
    state.rate_limiter.check(peer.ip()).await?;

    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let note_id = note_id_label(&request.note_id)?;
    validate_text(&request.text)?;

    state.telegram.deliver(&note_id, &request.text).await?;
    tracing::info!(
        note_id = %note_id,
        chars = request.text.chars().count(),
        "Relayed note transcript"
    );
    Ok(Json(RelayResponse { ok: true }))
}

/// Ids arrive as a timestamp number or a server-assigned string.
fn note_id_label(value: &Value) -> Result<String, AppError> {
    match value {
        Value::Number(number) => Ok(number.to_string()),
        Value::String(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        _ => Err(AppError::bad_request(
            "note_id must be a number or a non-empty string",
        )),
    }
}

fn validate_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::bad_request("text must not be empty"));
    }
    let chars = text.chars().count();
    if chars > MAX_NOTE_CHARS {
        return Err(AppError::bad_request(format!(
            "text is {chars} characters, the limit is {MAX_NOTE_CHARS}"
        )));
    }
    Ok(())
}
