//! Practice indicators from `GET /dashboard/`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::de::null_as_default;

/// One point of the recent progress series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    /// Patient name.
    pub patient: String,
    /// Session date.
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    /// Progress score recorded for the session.
    #[serde(default)]
    pub progress: f64,
    /// Adherence percentage.
    #[serde(default)]
    pub adherence: f64,
}

/// Aggregated indicators for the authenticated professional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Patients in active follow-up.
    #[serde(default)]
    pub total_active_patients: u32,
    /// Scales applied since the first day of the month.
    #[serde(default)]
    pub scales_applied_this_month: u32,
    /// Average progress over recorded sessions.
    #[serde(default)]
    pub average_progress: f64,
    /// Patients due for re-evaluation.
    #[serde(default)]
    pub pending_revaluations: u32,
    /// Adherence percentage.
    #[serde(default)]
    pub therapeutic_adherence_rate: f64,
    /// When the indicators were computed.
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// Most recent sessions, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress_series: Vec<ProgressPoint>,
}

impl DashboardMetrics {
    /// Highest progress value in the series.
    #[must_use]
    pub fn peak_progress(&self) -> Option<&ProgressPoint> {
        self.progress_series
            .iter()
            .max_by(|a, b| a.progress.total_cmp(&b.progress))
    }
}
