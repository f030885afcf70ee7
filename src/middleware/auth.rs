// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication gate for protected routes.
//!
//! The service holds a single athlete's Strava token; a request is allowed
//! through only once that token exists. Otherwise the browser is sent to the
//! login route instead of receiving an error.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Route that starts the OAuth flow.
pub const LOGIN_PATH: &str = "/auth/login";

/// Middleware that redirects to login until Strava authorization completed.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.auth.tokens().is_authenticated().await {
        tracing::debug!(path = %request.uri().path(), "Not authenticated, redirecting to login");
        return login_redirect();
    }

    next.run(request).await
}

/// `302 Found` to the login route.
pub fn login_redirect() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, LOGIN_PATH)]).into_response()
}
