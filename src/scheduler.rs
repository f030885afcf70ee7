// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic background duties: fetch cycle and token refresh.
//!
//! Each duty runs once immediately, then again after `interval` plus a random
//! jitter, until the shared cancellation token fires. A run that is already in
//! progress when cancellation arrives is allowed to finish.

use crate::services::{AuthService, FetchOutcome, FetchPipeline};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Interval and jitter for one periodic duty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicConfig {
    pub interval: Duration,
    /// Upper bound of the random delay added to each interval
    pub jitter: Duration,
}

impl PeriodicConfig {
    pub fn new(interval: Duration, jitter: Duration) -> Self {
        Self { interval, jitter }
    }

    /// Delay before the next run.
    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }
        let max_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        self.interval + Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

/// Spawn a periodic task that stops when `cancel` fires.
pub fn spawn_periodic<F, Fut>(
    name: &'static str,
    config: PeriodicConfig,
    cancel: CancellationToken,
    mut task: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tracing::info!(
            task = name,
            interval_secs = config.interval.as_secs(),
            jitter_secs = config.jitter.as_secs(),
            "Periodic task started"
        );

        while !cancel.is_cancelled() {
            task().await;

            let delay = config.next_delay();
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(task = name, "Periodic task stopped");
    })
}

/// Spawn the fetch cycle loop.
pub fn spawn_fetch_loop(
    pipeline: FetchPipeline,
    config: PeriodicConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    spawn_periodic("fetch_activities", config, cancel, move || {
        let pipeline = pipeline.clone();
        async move {
            match pipeline.run().await {
                Ok(FetchOutcome::Skipped) => {
                    tracing::info!("Scheduled fetch skipped (not authenticated)")
                }
                Ok(FetchOutcome::Completed(report)) => tracing::info!(
                    fetched = report.fetched,
                    failed = report.write_errors.len(),
                    "Scheduled fetch finished"
                ),
                Err(e) => tracing::error!(error = %e, "Scheduled fetch failed"),
            }
        }
    })
}

/// Spawn the token refresh loop.
pub fn spawn_refresh_loop(
    auth: AuthService,
    config: PeriodicConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    spawn_periodic("refresh_token", config, cancel, move || {
        let auth = auth.clone();
        async move {
            match auth.refresh().await {
                Ok(_) => tracing::info!("Access token refreshed successfully (scheduled)"),
                Err(e) => tracing::error!(error = %e, "Failed to refresh access token"),
            }
        }
    })
}
