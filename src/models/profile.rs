//! Aggregated cross-system student profile.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::taxonomy::AggregationStatus;

/// Opaque record returned by one subsystem, passed through as-is
pub type ProfileFragment = Map<String, Value>;

/// Result of the scatter-gather read for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedProfile {
    pub student_id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub year_level: Option<String>,
    #[serde(default)]
    pub aggregation_status: AggregationStatus,
    #[serde(default)]
    pub responses_received: u32,
    #[serde(default)]
    pub responses_expected: u32,
    #[serde(default)]
    pub aggregation_time_ms: u64,
    #[serde(default)]
    pub aggregation_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub academic_records: Option<ProfileFragment>,
    #[serde(default)]
    pub housing: Option<ProfileFragment>,
    #[serde(default)]
    pub billing: Option<ProfileFragment>,
    #[serde(default)]
    pub library: Option<ProfileFragment>,
}

impl AggregatedProfile {
    /// Names of the fragments that arrived
    #[must_use]
    pub fn present_fragments(&self) -> Vec<&'static str> {
        [
            ("academicRecords", self.academic_records.is_some()),
            ("housing", self.housing.is_some()),
            ("billing", self.billing.is_some()),
            ("library", self.library.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Received/expected as a percentage, 0 when nothing was expected
    #[must_use]
    pub fn completion_percentage(&self) -> f64 {
        if self.responses_expected == 0 {
            return 0.0;
        }
        let received = self.responses_received.min(self.responses_expected);
        f64::from(received) / f64::from(self.responses_expected) * 100.0
    }
}
