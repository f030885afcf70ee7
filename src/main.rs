// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava TSS Exporter Server
//!
//! Serves the Strava OAuth login and runs the scheduled fetch and token
//! refresh loops that feed enriched activities into InfluxDB.

use anyhow::Context;
use std::sync::Arc;
use strava_tss_exporter::{
    config::Config,
    db::{ActivityWriter, InfluxWriter},
    scheduler::{self, PeriodicConfig},
    services::{AuthService, FetchPipeline, FtpHistory, StravaClient, TokenStore},
    AppState,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Strava TSS exporter");

    // Load FTP history (any bad row is fatal)
    let ftp_path = config.ftp_file_path();
    tracing::info!(path = %ftp_path.display(), "Loading FTP history");
    let ftp_history = Arc::new(
        FtpHistory::load_from_file(&ftp_path).context("Failed to load FTP history")?,
    );

    // Connect to InfluxDB
    let influx = InfluxWriter::new(
        &config.influxdb_url,
        config.influxdb_token.clone(),
        config.influxdb_org.clone(),
        config.influxdb_bucket.clone(),
        config.http_timeout,
    )?;
    influx
        .ping()
        .await
        .context("InfluxDB connection failed")?;
    let writer: Arc<dyn ActivityWriter> = Arc::new(influx);

    // Strava client and token state shared by the auth flow and the pipeline
    let strava = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        config.http_timeout,
    )?;
    let tokens = TokenStore::new();
    let auth = AuthService::new(
        strava.clone(),
        tokens.clone(),
        config.oauth_callback_url.clone(),
    );
    let pipeline = FetchPipeline::new(strava, tokens, ftp_history.clone(), writer);

    // Background loops, stopped on shutdown
    let cancel = CancellationToken::new();
    let fetch_handle = scheduler::spawn_fetch_loop(
        pipeline.clone(),
        PeriodicConfig::new(config.fetch_interval, config.scheduler_jitter),
        cancel.clone(),
    );
    let refresh_handle = scheduler::spawn_refresh_loop(
        auth.clone(),
        PeriodicConfig::new(config.token_refresh_interval, config.scheduler_jitter),
        cancel.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        auth,
        pipeline,
        ftp_history,
    });

    // Build router
    let app = strava_tss_exporter::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    // Server has stopped; make sure the loops see cancellation too
    cancel.cancel();
    for handle in [fetch_handle, refresh_handle] {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Background task terminated unexpectedly");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_tss_exporter=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM and cancel the background loops.
async fn shutdown_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
