// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod ftp;
pub mod summary;
pub mod token;

pub use activity::Activity;
pub use ftp::FtpRecord;
pub use summary::TssSummary;
pub use token::{TokenResponse, TokenState};
