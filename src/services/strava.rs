// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Authorization URL construction
//! - Token exchange and refresh against the OAuth token endpoint
//! - Activity listing for a bounded time window
//! - Rate limit and expired-token detection

use crate::error::AppError;
use crate::models::{Activity, TokenResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_OAUTH_BASE_URL: &str = "https://www.strava.com/oauth";

/// Scope requested at login.
pub const OAUTH_SCOPE: &str = "activity:read_all";

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base_url: String,
    oauth_base_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    ///
    /// Every request is bounded by `timeout`; expiry surfaces as a transport error.
    pub fn new(
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            client_id,
            client_secret,
        })
    }

    /// Point the client at different API and OAuth hosts (used by tests).
    pub fn with_base_urls(mut self, api_base_url: &str, oauth_base_url: &str) -> Self {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self.oauth_base_url = oauth_base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build the URL the user is sent to for consent.
    pub fn authorize_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}/authorize?\
             client_id={}&\
             response_type=code&\
             redirect_uri={}&\
             approval_prompt=auto&\
             scope={}",
            self.oauth_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            OAUTH_SCOPE
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token exchange request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Exchange a refresh token for a new token set.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// List the athlete's activities started between `after` and `before`.
    ///
    /// Fetches a single page; callers get at most `per_page` activities.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,  // Unix timestamp
        before: i64, // Unix timestamp
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>, AppError> {
        let url = format!("{}/athlete/activities", self.api_base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("before", before.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.oauth_base_url)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::StravaApi(
                    AppError::STRAVA_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Summary activity from `GET /athlete/activities`.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: i64,
    pub start_date: DateTime<Utc>,
    /// Seconds
    #[serde(default)]
    pub moving_time: f64,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Absent for activities recorded without power
    #[serde(default)]
    pub average_watts: Option<f64>,
}

impl From<StravaActivitySummary> for Activity {
    /// Map the upstream fields; `ftp`, `np` and `tss` are filled in later.
    fn from(summary: StravaActivitySummary) -> Self {
        Activity {
            id: summary.id,
            start_time: summary.start_date,
            duration_seconds: summary.moving_time,
            distance_meters: summary.distance,
            elevation_meters: summary.total_elevation_gain,
            average_watts: summary.average_watts.unwrap_or(0.0),
            ftp: 0.0,
            np: None,
            tss: None,
        }
    }
}
