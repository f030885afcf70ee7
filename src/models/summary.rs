//! TSS aggregates per ISO week, calendar month and calendar year.
//!
//! Computed per fetch cycle for logging only; nothing here is persisted.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Activity;
use crate::time_utils::{iso_week_key, month_key, year_key};

/// Summed TSS for one batch of activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TssSummary {
    /// TSS per ISO week ("YYYY-Www" format)
    pub weekly: BTreeMap<String, f64>,
    /// TSS per month ("YYYY-MM" format)
    pub monthly: BTreeMap<String, f64>,
    /// TSS per year ("YYYY" format)
    pub yearly: BTreeMap<String, f64>,
}

impl TssSummary {
    /// Aggregate a batch. Activities without a valid TSS are skipped.
    pub fn from_activities(activities: &[Activity]) -> Self {
        let mut summary = Self::default();
        for activity in activities {
            summary.add(activity);
        }
        summary
    }

    /// Add a single activity's TSS to every period it falls in.
    pub fn add(&mut self, activity: &Activity) {
        let Some(tss) = activity.tss else {
            return;
        };

        *self
            .weekly
            .entry(iso_week_key(activity.start_time))
            .or_insert(0.0) += tss;
        *self
            .monthly
            .entry(month_key(activity.start_time))
            .or_insert(0.0) += tss;
        *self
            .yearly
            .entry(year_key(activity.start_time))
            .or_insert(0.0) += tss;
    }

    pub fn is_empty(&self) -> bool {
        self.yearly.is_empty()
    }
}
