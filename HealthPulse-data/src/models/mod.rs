//! Storage models
//!
//! Rows are kept close to their SQLite shape: identifiers and timestamps are
//! strings, enumerations are their snake_case names. Timestamps are always
//! written through [`format_timestamp`] so that lexical order is time order.

use chrono::{DateTime, SecondsFormat, Utc};

pub mod alert;
pub mod health_metric;
pub mod insight;
pub mod medication;
pub mod profile;

pub use alert::{CreateHealthAlertRequest, HealthAlert};
pub use health_metric::{CreateHealthMetricRequest, HealthMetric};
pub use insight::{AiInsight, CreateAiInsightRequest};
pub use medication::{CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationLog};
pub use profile::{Profile, UpsertProfileRequest};

/// Render a timestamp in the canonical storage format
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time in the canonical storage format
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();

        let a = format_timestamp(earlier);
        let b = format_timestamp(later);

        assert_eq!(a, "2024-03-09T23:59:59.000000Z");
        assert!(a < b);
    }
}
