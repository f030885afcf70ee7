// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// ISO week key (`YYYY-Www`), using the ISO week-numbering year.
pub fn iso_week_key(date: DateTime<Utc>) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// Calendar month key (`YYYY-MM`).
pub fn month_key(date: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Calendar year key (`YYYY`).
pub fn year_key(date: DateTime<Utc>) -> String {
    format!("{:04}", date.year())
}
