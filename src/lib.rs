// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava TSS exporter: training load from Strava activities into InfluxDB
//!
//! This crate pulls recent activities from Strava on a schedule, enriches
//! each one with the FTP in effect on its date, derives NP and TSS, and
//! writes the result to InfluxDB. It also runs the OAuth login needed to
//! keep Strava access alive without user interaction.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{AuthService, FetchPipeline, FtpHistory};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub pipeline: FetchPipeline,
    pub ftp_history: Arc<FtpHistory>,
}
