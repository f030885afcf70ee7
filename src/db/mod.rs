//! Storage layer (InfluxDB).

pub mod influx;

pub use influx::InfluxWriter;

use crate::models::Activity;
use serde::Serialize;

/// Measurement names as constants.
pub mod measurements {
    /// One point per enriched activity
    pub const ACTIVITY: &str = "activity";
}

/// Destination for enriched activities.
///
/// Writes are at-least-once and not transactional: each activity is written
/// on its own and one failure never prevents the others.
#[async_trait::async_trait]
pub trait ActivityWriter: Send + Sync {
    /// Write a batch, returning one error per activity that failed.
    async fn write(&self, activities: &[Activity]) -> Vec<WriteError>;
}

/// A single failed activity write.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("Failed to write activity {activity_id}: {message}")]
pub struct WriteError {
    pub activity_id: i64,
    pub message: String,
}
