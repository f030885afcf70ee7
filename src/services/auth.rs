// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth authorization flow: first-login code exchange and token refresh.
//!
//! This is the only writer of [`TokenStore`]. Both transitions hold a
//! transition lock across the network call, so the HTTP callback and the
//! refresh loop cannot interleave their read-modify-write of the tokens.

use crate::error::AppError;
use crate::models::token::redact;
use crate::models::{TokenResponse, TokenState};
use crate::services::strava::StravaClient;
use crate::services::token::TokenStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Authorization flow over a shared token store.
#[derive(Clone)]
pub struct AuthService {
    client: StravaClient,
    tokens: TokenStore,
    redirect_uri: String,
    transition_lock: Arc<Mutex<()>>,
}

impl AuthService {
    pub fn new(client: StravaClient, tokens: TokenStore, redirect_uri: String) -> Self {
        Self {
            client,
            tokens,
            redirect_uri,
            transition_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Strava consent URL with the fixed scope and callback.
    pub fn authorize_url(&self) -> String {
        self.client.authorize_url(&self.redirect_uri)
    }

    /// Exchange an authorization code and replace the token state.
    ///
    /// On any failure the existing state is left untouched.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenState, AuthError> {
        let code = code.trim();
        if code.is_empty() {
            tracing::warn!("Authorization code exchange attempted without a code");
            return Err(AuthError::MissingCode);
        }

        let _guard = self.transition_lock.lock().await;
        tracing::info!("Exchanging authorization code for tokens");

        let response = self.client.exchange_code(code).await.map_err(|e| {
            tracing::error!(error = %e, "Authorization code exchange failed");
            AuthError::Provider(e)
        })?;

        self.apply(response, "authorization_code").await
    }

    /// Exchange the current refresh token for a new token set.
    ///
    /// Fails immediately, without a network call, when no refresh token has
    /// been issued yet. Strava may rotate the refresh token, so the whole
    /// state is overwritten on success.
    pub async fn refresh(&self) -> Result<TokenState, AuthError> {
        // No refresh token: fail without waiting on the transition lock
        if self.tokens.refresh_token().await.is_none() {
            tracing::warn!("No refresh token available, skipping refresh");
            return Err(AuthError::NoRefreshToken);
        }

        let _guard = self.transition_lock.lock().await;

        // Re-read under the lock; a concurrent transition may have replaced it
        let Some(refresh_token) = self.tokens.refresh_token().await else {
            tracing::warn!("Refresh token cleared while waiting, skipping refresh");
            return Err(AuthError::NoRefreshToken);
        };

        tracing::info!(refresh_token = %redact(&refresh_token), "Refreshing access token");

        let response = self
            .client
            .refresh_token(&refresh_token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Access token refresh failed");
                AuthError::Provider(e)
            })?;

        self.apply(response, "refresh_token").await
    }

    /// Validate a token response and store it. Caller holds the transition lock.
    async fn apply(&self, response: TokenResponse, grant: &str) -> Result<TokenState, AuthError> {
        let expires_in = response.expires_in;
        let next = response.into_state().ok_or_else(|| {
            tracing::error!(grant, "Token response missing access token or valid expiry");
            AuthError::MalformedResponse
        })?;

        self.tokens.replace(next.clone()).await;

        tracing::info!(
            grant,
            access_token = %redact(&next.access_token),
            refresh_token = %redact(&next.refresh_token),
            expires_at = %next.expires_at,
            expires_in,
            "Access token obtained"
        );

        Ok(next)
    }
}

/// Authorization flow errors. Token state is unchanged whenever one is returned.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization code")]
    MissingCode,

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Token request failed: {0}")]
    Provider(AppError),

    #[error("Malformed token response")]
    MalformedResponse,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCode => AppError::BadRequest("Missing code in query".to_string()),
            // Provider details stay in the log
            AuthError::NoRefreshToken | AuthError::Provider(_) | AuthError::MalformedResponse => {
                AppError::Authorization("Failed to get token from Strava".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn service() -> AuthService {
        // Unroutable hosts: these tests must never reach the network
        let client = StravaClient::new(
            "client".to_string(),
            "secret".to_string(),
            Duration::from_millis(200),
        )
        .unwrap()
        .with_base_urls("http://127.0.0.1:9/api/v3", "http://127.0.0.1:9/oauth");

        AuthService::new(
            client,
            TokenStore::new(),
            "http://localhost:8080/auth/callback".to_string(),
        )
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_fails_fast() {
        let auth = service();
        let err = auth.refresh().await.unwrap_err();
        assert!(matches!(err, AuthError::NoRefreshToken));
        assert!(!auth.tokens().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_does_not_wait_for_lock() {
        let auth = service();
        let _in_flight = auth.transition_lock.lock().await;

        let result = tokio::time::timeout(Duration::from_millis(100), auth.refresh())
            .await
            .expect("refresh should not block behind an in-flight transition");
        assert!(matches!(result, Err(AuthError::NoRefreshToken)));
    }

    #[tokio::test]
    async fn test_empty_code_is_rejected() {
        let auth = service();
        assert!(matches!(
            auth.exchange_code("   ").await,
            Err(AuthError::MissingCode)
        ));
        assert!(!auth.tokens().is_authenticated().await);
    }

    #[test]
    fn test_auth_errors_do_not_leak_provider_details() {
        let err: AppError =
            AuthError::Provider(AppError::StravaApi("HTTP 400: secret body".to_string())).into();
        assert!(!err.to_string().contains("secret body"));
        assert!(matches!(err, AppError::Authorization(_)));

        let err: AppError = AuthError::MissingCode.into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_authorize_url_uses_configured_callback() {
        let url = service().authorize_url();
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback"));
        assert!(url.contains("scope=activity:read_all"));
    }
}
