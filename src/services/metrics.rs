// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training-load metric derivation (NP and TSS).

use crate::models::Activity;
use serde::Serialize;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Derived metrics for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub np: f64,
    pub tss: f64,
}

/// Derive NP and TSS from average power, moving time and FTP.
///
/// NP is approximated by average power; a true 30-second rolling
/// fourth-power NP needs the power stream, which the summary endpoint does
/// not provide.
pub fn derive(average_watts: f64, duration_seconds: f64, ftp: f64) -> Result<Metrics, MetricError> {
    if !ftp.is_finite() || ftp <= 0.0 {
        return Err(MetricError::InvalidFtp(ftp));
    }

    let np = average_watts;
    let intensity = np / ftp;
    let tss = (duration_seconds / SECONDS_PER_HOUR) * intensity * intensity * 100.0;

    if !np.is_finite() || !tss.is_finite() {
        return Err(MetricError::NonFinite);
    }

    Ok(Metrics { np, tss })
}

/// Set `ftp`, `np` and `tss` on an activity in place.
///
/// On error the FTP is still recorded and `np`/`tss` are cleared, so the
/// activity is explicitly marked as having no valid metrics.
pub fn enrich(activity: &mut Activity, ftp: f64) -> Result<Metrics, MetricError> {
    activity.ftp = ftp;
    match derive(activity.average_watts, activity.duration_seconds, ftp) {
        Ok(metrics) => {
            activity.np = Some(metrics.np);
            activity.tss = Some(metrics.tss);
            Ok(metrics)
        }
        Err(e) => {
            activity.np = None;
            activity.tss = None;
            Err(e)
        }
    }
}

/// Reasons a derivation is rejected instead of producing a non-finite TSS.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("FTP must be positive and finite, got {0}")]
    InvalidFtp(f64),

    #[error("Derived metrics are not finite")]
    NonFinite,
}
