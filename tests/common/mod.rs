// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strava_tss_exporter::config::Config;
use strava_tss_exporter::db::{ActivityWriter, WriteError};
use strava_tss_exporter::models::{Activity, TokenState};
use strava_tss_exporter::routes::create_router;
use strava_tss_exporter::services::{AuthService, FetchPipeline, FtpHistory, StravaClient, TokenStore};
use strava_tss_exporter::AppState;

/// In-memory writer that records successful writes and fails chosen IDs.
#[derive(Default)]
pub struct RecordingWriter {
    fail_ids: HashSet<i64>,
    written: Mutex<Vec<Activity>>,
}

#[allow(dead_code)]
impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(ids: &[i64]) -> Self {
        Self {
            fail_ids: ids.iter().copied().collect(),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<Activity> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ActivityWriter for RecordingWriter {
    async fn write(&self, activities: &[Activity]) -> Vec<WriteError> {
        let mut errors = Vec::new();
        for activity in activities {
            if self.fail_ids.contains(&activity.id) {
                errors.push(WriteError {
                    activity_id: activity.id,
                    message: "simulated write failure".to_string(),
                });
            } else {
                self.written.lock().unwrap().push(activity.clone());
            }
        }
        errors
    }
}

/// Strava client pointed at a mock server (or nowhere, if `None`).
#[allow(dead_code)]
pub fn test_strava_client(base_url: Option<&str>) -> StravaClient {
    // Port 9 (discard) is never listening; offline tests must not need it
    let base = base_url.unwrap_or("http://127.0.0.1:9");
    let config = Config::default();
    StravaClient::new(
        config.strava_client_id,
        config.strava_client_secret,
        Duration::from_secs(5),
    )
    .expect("Failed to build Strava client")
    .with_base_urls(&format!("{}/api/v3", base), &format!("{}/oauth", base))
}

/// `[(2024-01-01, 200), (2024-06-01, 210)]`
#[allow(dead_code)]
pub fn sample_ftp_history() -> Arc<FtpHistory> {
    Arc::new(
        FtpHistory::load_from_reader("date,ftp\n2024-01-01,200\n2024-06-01,210\n".as_bytes())
            .expect("Failed to load sample FTP history"),
    )
}

/// Build app state around the given Strava client, FTP history and writer.
#[allow(dead_code)]
pub fn create_test_state(
    strava: StravaClient,
    ftp_history: Arc<FtpHistory>,
    writer: Arc<dyn ActivityWriter>,
) -> Arc<AppState> {
    let config = Config::default();
    let tokens = TokenStore::new();
    let auth = AuthService::new(
        strava.clone(),
        tokens.clone(),
        config.oauth_callback_url.clone(),
    );
    let pipeline = FetchPipeline::new(strava, tokens, ftp_history.clone(), writer);

    Arc::new(AppState {
        config,
        auth,
        pipeline,
        ftp_history,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = create_test_state(
        test_strava_client(None),
        sample_ftp_history(),
        Arc::new(RecordingWriter::new()),
    );
    (create_router(state.clone()), state)
}

/// Put the shared token store into the authenticated state.
#[allow(dead_code)]
pub async fn authenticate(tokens: &TokenStore, access_token: &str, refresh_token: &str) {
    tokens
        .replace(TokenState {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        })
        .await;
}
