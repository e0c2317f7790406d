use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A phone number to call in an emergency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EmergencyNumber {
    pub name: String,
    pub number: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// What a first responder should know
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicalInfo {
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
}

/// Map search for nearby care
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct NearbySearch {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EmergencyInfo {
    pub emergency_services: Vec<EmergencyNumber>,
    pub helplines: Vec<EmergencyNumber>,
    /// Present only when both name and phone are on file
    pub emergency_contact: Option<EmergencyContact>,
    pub medical_info: MedicalInfo,
    /// Blood type, allergies or conditions still missing
    pub profile_incomplete: bool,
    pub nearby: Vec<NearbySearch>,
}
