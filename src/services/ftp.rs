// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FTP history loading and date lookup.

use crate::models::FtpRecord;
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// FTP used when no record is in effect yet.
pub const DEFAULT_FTP: f64 = 150.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-ordered FTP history, immutable once loaded.
#[derive(Debug, Default, Clone)]
pub struct FtpHistory {
    records: Vec<FtpRecord>,
}

impl FtpHistory {
    /// Load history from a two-column CSV file (`date,ftp` with a header row).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, FtpError> {
        let file = File::open(path.as_ref())
            .map_err(|e| FtpError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::load_from_reader(file)
    }

    /// Load history from CSV text. Any bad row fails the whole load.
    pub fn load_from_reader<R: Read>(reader: R) -> Result<Self, FtpError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let header_len = csv_reader
            .headers()
            .map_err(|e| FtpError::Csv(e.to_string()))?
            .len();
        if header_len != 2 {
            return Err(FtpError::FieldCount {
                row: 1,
                found: header_len,
            });
        }

        let mut records = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            // Header is line 1
            let row = idx + 2;
            let record = result.map_err(|e| FtpError::Csv(e.to_string()))?;
            if record.len() != 2 {
                return Err(FtpError::FieldCount {
                    row,
                    found: record.len(),
                });
            }

            let raw_date = &record[0];
            let effective_date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
                FtpError::InvalidDate {
                    row,
                    value: raw_date.to_string(),
                }
            })?;

            let raw_ftp = &record[1];
            let ftp = raw_ftp
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FtpError::InvalidFtp {
                    row,
                    value: raw_ftp.to_string(),
                })?;

            records.push(FtpRecord {
                effective_date,
                ftp,
            });
        }

        let history = Self::from_records(records)?;
        tracing::info!(count = history.len(), "Loaded FTP history");
        Ok(history)
    }

    /// Build a history from records that must already be in date order.
    pub fn from_records(records: Vec<FtpRecord>) -> Result<Self, FtpError> {
        if let Some(pos) = records
            .windows(2)
            .position(|pair| pair[1].effective_date < pair[0].effective_date)
        {
            return Err(FtpError::OutOfOrder {
                // Line of the later record; header is line 1
                row: pos + 3,
                date: records[pos + 1].effective_date,
            });
        }
        Ok(Self { records })
    }

    /// FTP of the latest record on or before `as_of`, or [`DEFAULT_FTP`].
    pub fn lookup(&self, as_of: NaiveDate) -> f64 {
        let mut ftp = DEFAULT_FTP;
        for record in &self.records {
            if record.effective_date > as_of {
                break;
            }
            ftp = record.ftp;
        }
        ftp
    }

    pub fn records(&self) -> &[FtpRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Errors from loading FTP history.
#[derive(Debug, thiserror::Error)]
pub enum FtpError {
    #[error("Failed to read FTP file: {0}")]
    Io(String),

    #[error("Failed to parse FTP CSV: {0}")]
    Csv(String),

    #[error("Row {row}: expected 2 fields, found {found}")]
    FieldCount { row: usize, found: usize },

    #[error("Row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}: invalid FTP value '{value}'")]
    InvalidFtp { row: usize, value: String },

    #[error("Row {row}: date {date} is earlier than the previous row")]
    OutOfOrder { row: usize, date: NaiveDate },
}
