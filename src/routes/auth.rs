// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::LOGIN_PATH;
use crate::AppState;

/// Route Strava redirects back to after consent.
pub const CALLBACK_PATH: &str = "/auth/callback";

const AUTH_COMPLETE_PAGE: &str =
    "<html><body><h2>Authentication complete.</h2><p>Please close this window.</p></body></html>";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(LOGIN_PATH, get(login))
        .route(CALLBACK_PATH, get(callback))
}

/// Start OAuth flow - redirect to Strava authorization.
async fn login(State(state): State<Arc<AppState>>) -> Redirect {
    tracing::info!(
        client_id = %state.config.strava_client_id,
        callback = %state.config.oauth_callback_url,
        "Starting OAuth flow, redirecting to Strava"
    );

    Redirect::temporary(&state.auth.authorize_url())
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<&'static str>> {
    // e.g. "access_denied" when the user declines
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::Authorization(
            "Strava authorization was not granted".to_string(),
        ));
    }

    state
        .auth
        .exchange_code(params.code.as_deref().unwrap_or_default())
        .await?;

    tracing::info!("OAuth successful, tokens stored");
    Ok(Html(AUTH_COMPLETE_PAGE))
}
