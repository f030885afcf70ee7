// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FTP history record.

use chrono::NaiveDate;
use serde::Serialize;

/// FTP value in effect from `effective_date` until the next record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FtpRecord {
    pub effective_date: NaiveDate,
    /// Watts
    pub ftp: f64,
}
