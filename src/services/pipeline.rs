// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fetch pipeline.
//!
//! Handles one fetch cycle:
//! 1. Skip unless authenticated
//! 2. List activities for the trailing window from Strava (single page)
//! 3. Look up FTP and derive NP/TSS per activity
//! 4. Aggregate TSS per week/month/year (logged only)
//! 5. Write the batch, collecting per-activity failures

use crate::db::{ActivityWriter, WriteError};
use crate::error::Result;
use crate::models::{Activity, TssSummary};
use crate::services::ftp::FtpHistory;
use crate::services::metrics;
use crate::services::strava::StravaClient;
use crate::services::token::TokenStore;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Trailing window requested from Strava.
pub const FETCH_WINDOW_DAYS: i64 = 180;

/// Single page size; no further pages are requested.
pub const FETCH_PAGE_SIZE: u32 = 200;

/// Orchestrates a fetch cycle over shared collaborators.
#[derive(Clone)]
pub struct FetchPipeline {
    strava: StravaClient,
    tokens: TokenStore,
    ftp_history: Arc<FtpHistory>,
    writer: Arc<dyn ActivityWriter>,
}

impl FetchPipeline {
    pub fn new(
        strava: StravaClient,
        tokens: TokenStore,
        ftp_history: Arc<FtpHistory>,
        writer: Arc<dyn ActivityWriter>,
    ) -> Self {
        Self {
            strava,
            tokens,
            ftp_history,
            writer,
        }
    }

    /// Run one fetch cycle.
    ///
    /// An upstream failure aborts the cycle before anything is enriched or
    /// written; later failures are per activity and reported in the result.
    pub async fn run(&self) -> Result<FetchOutcome> {
        let Some(access_token) = self.tokens.access_token().await else {
            tracing::info!("Not authenticated, skipping fetch cycle");
            return Ok(FetchOutcome::Skipped);
        };

        let now = Utc::now();
        let after = now - Duration::days(FETCH_WINDOW_DAYS);
        tracing::info!(
            after = %after,
            before = %now,
            per_page = FETCH_PAGE_SIZE,
            "Fetching activities from Strava"
        );

        let summaries = self
            .strava
            .list_activities(
                &access_token,
                after.timestamp(),
                now.timestamp(),
                FETCH_PAGE_SIZE,
            )
            .await
            .inspect_err(|e| {
                if e.is_strava_token_error() {
                    tracing::warn!(error = %e, "Strava rejected the access token, waiting for refresh");
                } else {
                    tracing::error!(error = %e, "Failed to fetch activities");
                }
            })?;

        if summaries.len() as u32 >= FETCH_PAGE_SIZE {
            tracing::warn!(
                count = summaries.len(),
                "Activity page is full; older activities in the window were not fetched"
            );
        }

        let activities = summaries.into_iter().map(Activity::from).collect();
        Ok(FetchOutcome::Completed(self.process_batch(activities).await))
    }

    /// Enrich, aggregate and write a batch of activities.
    pub async fn process_batch(&self, mut activities: Vec<Activity>) -> FetchReport {
        let mut invalid_metrics = 0;
        for activity in &mut activities {
            let ftp = self.ftp_history.lookup(activity.start_date());
            if let Err(e) = metrics::enrich(activity, ftp) {
                invalid_metrics += 1;
                tracing::warn!(
                    activity_id = activity.id,
                    ftp,
                    error = %e,
                    "Skipping NP/TSS for activity"
                );
            }
        }

        let summary = TssSummary::from_activities(&activities);
        tracing::info!(
            weekly = ?summary.weekly,
            monthly = ?summary.monthly,
            yearly = ?summary.yearly,
            "TSS summary"
        );

        let write_errors = self.writer.write(&activities).await;
        for e in &write_errors {
            tracing::error!(activity_id = e.activity_id, error = %e.message, "Failed to write activity");
        }

        let report = FetchReport {
            fetched: activities.len(),
            written: activities.len().saturating_sub(write_errors.len()),
            invalid_metrics,
            write_errors,
            summary,
        };

        tracing::info!(
            fetched = report.fetched,
            written = report.written,
            invalid_metrics = report.invalid_metrics,
            failed = report.write_errors.len(),
            "Fetch cycle complete"
        );

        report
    }
}

/// Result of a fetch cycle.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Not authenticated; no request was made.
    Skipped,
    Completed(FetchReport),
}

/// Per-cycle counts and the informational TSS summary.
#[derive(Debug, Serialize)]
pub struct FetchReport {
    pub fetched: usize,
    pub written: usize,
    pub invalid_metrics: usize,
    pub write_errors: Vec<WriteError>,
    pub summary: TssSummary,
}
