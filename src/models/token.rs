// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth token state and the Strava token endpoint response.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Current OAuth credentials held by the process.
///
/// An empty `access_token` means unauthenticated. Values are only ever
/// replaced whole, never merged field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry reported by Strava (Unix epoch when unset)
    pub expires_at: DateTime<Utc>,
}

impl TokenState {
    /// The sole authentication predicate used by the rest of the service.
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Token response from `POST /oauth/token` (both grant types).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp
    pub expires_at: i64,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Convert into a [`TokenState`], rejecting responses that would not
    /// leave the service authenticated.
    pub fn into_state(self) -> Option<TokenState> {
        if self.access_token.is_empty() {
            return None;
        }
        let expires_at = DateTime::<Utc>::from_timestamp(self.expires_at, 0)?;
        Some(TokenState {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}

/// Short, log-safe summary of a credential.
pub fn redact(token: &str) -> String {
    if token.is_empty() {
        return "<none>".to_string();
    }
    let prefix: String = token.chars().take(4).collect();
    format!("{}…", prefix)
}
