use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// The kinds of measurement a user can record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    HeartRate,
    BloodPressure,
    OxygenLevel,
    Temperature,
    Weight,
    Steps,
    SleepHours,
}

impl MetricType {
    pub const ALL: [MetricType; 7] = [
        MetricType::HeartRate,
        MetricType::BloodPressure,
        MetricType::OxygenLevel,
        MetricType::Temperature,
        MetricType::Weight,
        MetricType::Steps,
        MetricType::SleepHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::HeartRate => "heart_rate",
            MetricType::BloodPressure => "blood_pressure",
            MetricType::OxygenLevel => "oxygen_level",
            MetricType::Temperature => "temperature",
            MetricType::Weight => "weight",
            MetricType::Steps => "steps",
            MetricType::SleepHours => "sleep_hours",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            MetricType::HeartRate => "Heart Rate",
            MetricType::BloodPressure => "Blood Pressure",
            MetricType::OxygenLevel => "Oxygen Level",
            MetricType::Temperature => "Temperature",
            MetricType::Weight => "Weight",
            MetricType::Steps => "Steps",
            MetricType::SleepHours => "Sleep Hours",
        }
    }

    /// Unit stored with every reading of this type
    pub fn unit(&self) -> &'static str {
        match self {
            MetricType::HeartRate => "bpm",
            MetricType::BloodPressure => "mmHg",
            MetricType::OxygenLevel => "%",
            MetricType::Temperature => "°F",
            MetricType::Weight => "lbs",
            MetricType::Steps => "steps",
            MetricType::SleepHours => "hours",
        }
    }

    /// Physically plausible bounds for the primary value. Readings outside
    /// these are rejected as input errors rather than flagged as abnormal.
    /// For blood pressure this is the systolic range.
    pub fn plausible_range(&self) -> (f64, f64) {
        match self {
            MetricType::HeartRate => (20.0, 250.0),
            MetricType::BloodPressure => (40.0, 300.0),
            MetricType::OxygenLevel => (50.0, 100.0),
            MetricType::Temperature => (80.0, 115.0),
            MetricType::Weight => (1.0, 1500.0),
            MetricType::Steps => (0.0, 200_000.0),
            MetricType::SleepHours => (0.0, 24.0),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown metric type: {}", s))
    }
}

/// A single recorded measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub metric_type: MetricType,
    /// Primary value. For blood pressure this mirrors the systolic reading.
    pub value: f64,
    pub unit: String,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl HealthMetric {
    /// Display form of the value, `120/80` for blood pressure
    pub fn display_value(&self) -> String {
        match (self.metric_type, self.systolic, self.diastolic) {
            (MetricType::BloodPressure, Some(sys), Some(dia)) => {
                format!("{}/{}", format_number(sys), format_number(dia))
            }
            _ => format_number(self.value),
        }
    }
}

/// Format a reading without a trailing `.0` for whole numbers
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", (value * 100.0).round() / 100.0)
    }
}

/// Request payload for recording a measurement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateHealthMetricRequest {
    pub metric_type: MetricType,

    /// Required for every type except blood pressure
    pub value: Option<f64>,

    /// Required for blood pressure
    pub systolic: Option<f64>,

    /// Required for blood pressure
    pub diastolic: Option<f64>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// Defaults to now. At most five minutes in the future.
    pub recorded_at: Option<DateTime<Utc>>,
}

/// A validated measurement about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewHealthMetric {
    pub metric_type: MetricType,
    pub value: f64,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Latest reading of one type, with the direction it moved since the previous one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MetricSnapshot {
    pub metric_type: MetricType,
    pub label: String,
    pub display_value: String,
    pub unit: String,
    pub recorded_at: DateTime<Utc>,
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Steady,
}

/// One point of a chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MetricPoint {
    pub recorded_at: DateTime<Utc>,
    pub value: f64,
}

/// Summary of the most recent readings used by the metrics screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MetricsOverview {
    /// One entry per metric type that has readings, in `MetricType::ALL` order
    pub latest: Vec<MetricSnapshot>,
    /// Recent heart rate readings, oldest first
    pub heart_rate_series: Vec<MetricPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_round_trips_through_str() {
        for metric_type in MetricType::ALL {
            assert_eq!(metric_type.as_str().parse::<MetricType>().unwrap(), metric_type);
        }
        assert!("pulse".parse::<MetricType>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&MetricType::OxygenLevel).unwrap();
        assert_eq!(json, "\"oxygen_level\"");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(72.0), "72");
        assert_eq!(format_number(98.64), "98.64");
        assert_eq!(format_number(7.456), "7.46");
    }
}
