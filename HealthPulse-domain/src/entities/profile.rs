use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::validation::{validate_blood_type, validate_gender, validate_list_entries, validate_phone_number};

/// A user's health profile. Its id is the authenticated user's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// One of `male`, `female`, `other`, `prefer_not_to_say`
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    /// ABO/Rh type such as `O+`
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// An empty profile, used before the user has saved anything
    pub fn empty(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            full_name: None,
            date_of_birth: None,
            gender: None,
            phone_number: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            blood_type: None,
            allergies: Vec::new(),
            chronic_conditions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Age in whole years on `today`
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| age_on(dob, today))
    }
}

/// Whole years between `date_of_birth` and `today`, counting a year only once
/// the birthday has passed. None for dates in the future.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if date_of_birth > today {
        return None;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Request payload for saving a profile. Every field replaces the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateProfileRequest {
    #[validate(length(max = 200, message = "Full name cannot exceed 200 characters"))]
    pub full_name: Option<String>,

    /// Must not be in the future
    pub date_of_birth: Option<NaiveDate>,

    #[validate(custom = "validate_gender")]
    pub gender: Option<String>,

    #[validate(custom = "validate_phone_number")]
    pub phone_number: Option<String>,

    #[validate(length(max = 200, message = "Emergency contact name cannot exceed 200 characters"))]
    pub emergency_contact_name: Option<String>,

    #[validate(custom = "validate_phone_number")]
    pub emergency_contact_phone: Option<String>,

    #[validate(custom = "validate_blood_type")]
    pub blood_type: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_list_entries")]
    pub allergies: Vec<String>,

    #[serde(default)]
    #[validate(custom = "validate_list_entries")]
    pub chronic_conditions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_respects_birthday() {
        let dob = date(1990, 6, 15);
        assert_eq!(age_on(dob, date(2024, 6, 14)), Some(33));
        assert_eq!(age_on(dob, date(2024, 6, 15)), Some(34));
        assert_eq!(age_on(dob, date(1990, 6, 15)), Some(0));
        assert_eq!(age_on(dob, date(1989, 1, 1)), None);
    }

    #[test]
    fn test_update_request_validation() {
        let valid = UpdateProfileRequest {
            full_name: Some("Asha Rao".to_string()),
            gender: Some("female".to_string()),
            blood_type: Some("B+".to_string()),
            phone_number: Some("+91 98765 43210".to_string()),
            allergies: vec!["penicillin".to_string()],
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let invalid = UpdateProfileRequest {
            blood_type: Some("Z".to_string()),
            ..Default::default()
        };
        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("blood_type"));
    }
}
