// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routes available once Strava authorization has completed.

use crate::error::{AppError, Result};
use crate::middleware::auth::login_redirect;
use crate::services::FetchOutcome;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_status))
        .route("/fetch", post(trigger_fetch))
}

// ─── Status ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
    pub expires_at: Option<String>,
    pub ftp_records: usize,
    pub current_ftp: f64,
}

/// Token and FTP status. Never includes token values.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let tokens = state.auth.tokens().snapshot().await;
    let authenticated = tokens.is_authenticated();

    Json(StatusResponse {
        authenticated,
        expires_at: authenticated.then(|| format_utc_rfc3339(tokens.expires_at)),
        ftp_records: state.ftp_history.len(),
        current_ftp: state.ftp_history.lookup(Utc::now().date_naive()),
    })
}

// ─── Manual Fetch ────────────────────────────────────────────

/// Run one fetch cycle now, outside the schedule.
async fn trigger_fetch(State(state): State<Arc<AppState>>) -> Result<Json<FetchOutcome>> {
    tracing::info!("Manual fetch requested");
    let outcome = state.pipeline.run().await?;
    Ok(Json(outcome))
}

// ─── Fallback ────────────────────────────────────────────────

/// Unknown paths are gated like every other route.
pub async fn fallback(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    if !state.auth.tokens().is_authenticated().await {
        return login_redirect();
    }
    AppError::NotFound(uri.path().to_string()).into_response()
}
