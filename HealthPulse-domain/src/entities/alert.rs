use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    AbnormalReading,
    MedicationReminder,
    Emergency,
    Appointment,
}

impl AlertType {
    pub const ALL: [AlertType; 4] = [
        AlertType::AbnormalReading,
        AlertType::MedicationReminder,
        AlertType::Emergency,
        AlertType::Appointment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::AbnormalReading => "abnormal_reading",
            AlertType::MedicationReminder => "medication_reminder",
            AlertType::Emergency => "emergency",
            AlertType::Appointment => "appointment",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown alert type: {}", s))
    }
}

/// Alert severity, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 4] = [
        AlertSeverity::Low,
        AlertSeverity::Medium,
        AlertSeverity::High,
        AlertSeverity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertSeverity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| format!("Unknown alert severity: {}", s))
    }
}

/// A health alert raised for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub related_metric_id: Option<Uuid>,
    pub related_medication_id: Option<Uuid>,
    pub is_read: bool,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// An alert about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewHealthAlert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub related_metric_id: Option<Uuid>,
    pub related_medication_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Critical > AlertSeverity::High);
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
    }

    #[test]
    fn test_parse() {
        assert_eq!("critical".parse::<AlertSeverity>().unwrap(), AlertSeverity::Critical);
        assert_eq!("medication_reminder".parse::<AlertType>().unwrap(), AlertType::MedicationReminder);
        assert!("urgent".parse::<AlertSeverity>().is_err());
    }
}
