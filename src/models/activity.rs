// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Enriched Strava activity, as written to InfluxDB.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One workout with its derived training-load metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: i64,
    /// Start time (UTC)
    pub start_time: DateTime<Utc>,
    /// Moving time in seconds
    pub duration_seconds: f64,
    /// Distance in meters
    pub distance_meters: f64,
    /// Total elevation gain in meters
    pub elevation_meters: f64,
    /// Average power in watts (0 when the activity has no power data)
    pub average_watts: f64,
    /// FTP in effect on the start date
    pub ftp: f64,
    /// Normalized Power, `None` when derivation was rejected
    pub np: Option<f64>,
    /// Training Stress Score, `None` when derivation was rejected
    pub tss: Option<f64>,
}

impl Activity {
    /// Calendar date (UTC) used for the FTP lookup.
    pub fn start_date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    /// Whether NP and TSS were successfully derived.
    pub fn metrics_valid(&self) -> bool {
        self.np.is_some() && self.tss.is_some()
    }
}
