// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod ftp;
pub mod metrics;
pub mod pipeline;
pub mod strava;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use ftp::{FtpError, FtpHistory};
pub use pipeline::{FetchOutcome, FetchPipeline, FetchReport};
pub use strava::StravaClient;
pub use token::TokenStore;
