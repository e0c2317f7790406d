use serde::{Deserialize, Serialize};

/// Storage model for a medication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    /// Scheduled times as `HH:MM`
    pub time_of_day: Vec<String>,
    /// Start date as `YYYY-MM-DD`
    pub start_date: String,
    pub end_date: Option<String>,
    pub instructions: Option<String>,
    pub prescribing_doctor: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Input data for creating a new medication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicationRequest {
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub time_of_day: Vec<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub instructions: Option<String>,
    pub prescribing_doctor: Option<String>,
}

/// Storage model for a single scheduled dose
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationLog {
    pub id: String,
    pub user_id: String,
    pub medication_id: String,
    pub scheduled_time: String,
    pub taken_at: Option<String>,
    /// One of `pending`, `taken`, `missed`, `skipped`
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Input data for recording a dose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicationLogRequest {
    pub user_id: String,
    pub medication_id: String,
    pub scheduled_time: String,
    pub taken_at: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}
