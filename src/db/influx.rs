// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! InfluxDB v2 writer for enriched activities.
//!
//! Each activity becomes one line-protocol point in the `activity`
//! measurement, tagged by Strava ID and timestamped at the activity start.

use crate::db::{measurements, ActivityWriter, WriteError};
use crate::error::AppError;
use crate::models::Activity;
use crate::time_utils::format_utc_rfc3339;
use futures_util::{future, stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

const MAX_CONCURRENT_WRITES: usize = 8;

/// InfluxDB client bound to one org/bucket.
#[derive(Clone)]
pub struct InfluxWriter {
    http: reqwest::Client,
    url: String,
    token: String,
    org: String,
    bucket: String,
}

impl InfluxWriter {
    pub fn new(
        url: &str,
        token: String,
        org: String,
        bucket: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Storage(format!("Failed to build InfluxDB client: {}", e)))?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            token,
            org,
            bucket,
        })
    }

    /// Check that the server is reachable and healthy.
    pub async fn ping(&self) -> Result<(), AppError> {
        let response = self
            .http
            .get(format!("{}/health", self.url))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to connect to InfluxDB: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "InfluxDB health check returned HTTP {}",
                response.status()
            )));
        }

        tracing::info!(url = %self.url, org = %self.org, bucket = %self.bucket, "Connected to InfluxDB");
        Ok(())
    }

    async fn write_point(&self, activity: &Activity) -> Result<(), WriteError> {
        let write_error = |message: String| WriteError {
            activity_id: activity.id,
            message,
        };

        let response = self
            .http
            .post(format!("{}/api/v2/write", self.url))
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "s"),
            ])
            .body(to_line_protocol(activity))
            .send()
            .await
            .map_err(|e| write_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(write_error(format!("HTTP {}: {}", status, body)));
        }

        tracing::debug!(activity_id = activity.id, "Activity written");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivityWriter for InfluxWriter {
    async fn write(&self, activities: &[Activity]) -> Vec<WriteError> {
        let writes: Vec<_> = activities
            .iter()
            .map(|activity| self.write_point(activity))
            .collect();
        stream::iter(writes)
            .buffer_unordered(MAX_CONCURRENT_WRITES)
            .filter_map(|result| future::ready(result.err()))
            .collect()
            .await
    }
}

/// Encode one activity as an InfluxDB line-protocol point.
///
/// `np` and `tss` are omitted when derivation was rejected; `metrics_valid`
/// records which case applies.
pub fn to_line_protocol(activity: &Activity) -> String {
    let mut fields = vec![
        format!("start_time=\"{}\"", format_utc_rfc3339(activity.start_time)),
        format!("duration={}", activity.duration_seconds),
        format!("distance={}", activity.distance_meters),
        format!("elevation={}", activity.elevation_meters),
        format!("average_watt={}", activity.average_watts),
        format!("ftp={}", activity.ftp),
    ];

    if let (Some(np), Some(tss)) = (activity.np, activity.tss) {
        fields.push(format!("np={}", np));
        fields.push(format!("tss={}", tss));
    }
    fields.push(format!("metrics_valid={}", activity.metrics_valid()));

    format!(
        "{},id={} {} {}",
        measurements::ACTIVITY,
        activity.id,
        fields.join(","),
        activity.start_time.timestamp()
    )
}
