use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::validation::validate_times_of_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MedicationFrequency {
    Daily,
    TwiceDaily,
    ThreeTimesDaily,
    FourTimesDaily,
    AsNeeded,
    Weekly,
}

impl MedicationFrequency {
    pub const ALL: [MedicationFrequency; 6] = [
        MedicationFrequency::Daily,
        MedicationFrequency::TwiceDaily,
        MedicationFrequency::ThreeTimesDaily,
        MedicationFrequency::FourTimesDaily,
        MedicationFrequency::AsNeeded,
        MedicationFrequency::Weekly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationFrequency::Daily => "daily",
            MedicationFrequency::TwiceDaily => "twice_daily",
            MedicationFrequency::ThreeTimesDaily => "three_times_daily",
            MedicationFrequency::FourTimesDaily => "four_times_daily",
            MedicationFrequency::AsNeeded => "as_needed",
            MedicationFrequency::Weekly => "weekly",
        }
    }
}

impl fmt::Display for MedicationFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MedicationFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MedicationFrequency::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("Unknown medication frequency: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MedicationLogStatus {
    Pending,
    Taken,
    Missed,
    Skipped,
}

impl MedicationLogStatus {
    pub const ALL: [MedicationLogStatus; 4] = [
        MedicationLogStatus::Pending,
        MedicationLogStatus::Taken,
        MedicationLogStatus::Missed,
        MedicationLogStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationLogStatus::Pending => "pending",
            MedicationLogStatus::Taken => "taken",
            MedicationLogStatus::Missed => "missed",
            MedicationLogStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for MedicationLogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MedicationLogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MedicationLogStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("Unknown medication log status: {}", s))
    }
}

/// A medication in the user's regimen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: MedicationFrequency,
    /// Scheduled times in 24-hour `HH:MM`
    pub time_of_day: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub prescribing_doctor: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for adding a medication
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMedicationRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Dosage must be between 1 and 100 characters"))]
    pub dosage: String,

    pub frequency: MedicationFrequency,

    /// Defaults to `["08:00"]` for scheduled frequencies
    #[serde(default)]
    #[validate(custom = "validate_times_of_day")]
    pub time_of_day: Vec<String>,

    /// Defaults to today
    pub start_date: Option<NaiveDate>,

    /// Must not be before the start date
    pub end_date: Option<NaiveDate>,

    #[validate(length(max = 1000, message = "Instructions cannot exceed 1000 characters"))]
    pub instructions: Option<String>,

    #[validate(length(max = 200, message = "Prescribing doctor cannot exceed 200 characters"))]
    pub prescribing_doctor: Option<String>,
}

/// A validated medication about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: MedicationFrequency,
    pub time_of_day: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub prescribing_doctor: Option<String>,
}

/// Request payload for switching a medication on or off
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SetMedicationActiveRequest {
    pub is_active: bool,
}

/// A scheduled dose and what happened to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicationLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medication_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub taken_at: Option<DateTime<Utc>>,
    pub status: MedicationLogStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for logging a dose
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMedicationLogRequest {
    pub scheduled_time: DateTime<Utc>,

    pub status: MedicationLogStatus,

    /// Defaults to now when the status is `taken`. Not allowed while `pending`.
    pub taken_at: Option<DateTime<Utc>>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// A validated dose log about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicationLog {
    pub medication_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub taken_at: Option<DateTime<Utc>>,
    pub status: MedicationLogStatus,
    pub notes: Option<String>,
}
