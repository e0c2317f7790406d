use serde::{Deserialize, Serialize};

/// Storage model for a user profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Profile identifier, equal to the owning user's id
    pub id: String,
    pub full_name: Option<String>,
    /// Date of birth as `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub blood_type: Option<String>,
    /// Stored as NULL when the user has no allergies on record
    pub allergies: Option<Vec<String>>,
    /// Stored as NULL when the user has no conditions on record
    pub chronic_conditions: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input data for creating or replacing a profile
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpsertProfileRequest {
    pub id: String,
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub chronic_conditions: Option<Vec<String>>,
}
