use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::conversions;
use crate::entities::{
    EmergencyContact, EmergencyInfo, EmergencyNumber, MedicalInfo, NearbySearch, Profile, UpdateProfileRequest,
};
use super::errors::{validation_message, ServiceError};
use super::{Repositories, SharedProfileRepository};

/// Trait for profile service operations
#[async_trait]
pub trait ProfileServiceTrait: Send + Sync {
    /// Validate an update request beyond what the field validators check
    fn validate_update_request(&self, request: &UpdateProfileRequest) -> Result<(), ServiceError>;

    /// Get the caller's profile
    async fn get_profile(&self, user_id: Uuid) -> Result<Profile, ServiceError>;

    /// Create or replace the caller's profile
    async fn update_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<Profile, ServiceError>;

    /// Emergency numbers plus whatever the profile says about the caller
    async fn emergency_info(&self, user_id: Uuid) -> Result<EmergencyInfo, ServiceError>;
}

/// Profile service for domain logic
pub struct ProfileService {
    profiles: SharedProfileRepository,
}

impl ProfileService {
    pub fn new(profiles: SharedProfileRepository) -> Self {
        Self { profiles }
    }

    /// The stored profile, if the user has saved one
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, ServiceError> {
        self.profiles
            .get_by_id(&user_id.to_string())
            .await?
            .map(conversions::convert_to_domain_profile)
            .transpose()
            .map_err(ServiceError::Repository)
    }
}

fn earliest_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Trim entries and drop the blank ones
fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn clean_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn number(name: &str, number: &str, description: &str) -> EmergencyNumber {
    EmergencyNumber {
        name: name.to_string(),
        number: number.to_string(),
        description: description.to_string(),
    }
}

pub fn emergency_services() -> Vec<EmergencyNumber> {
    vec![
        number("Ambulance", "108", "Emergency ambulance service"),
        number("Medical Emergency", "102", "Medical emergency and patient transport"),
    ]
}

pub fn helplines() -> Vec<EmergencyNumber> {
    vec![
        number("National Health Helpline", "104", "Medical advice and information"),
        number("Mental Health Helpline", "9152987821", "Counselling and crisis support"),
        number("Police", "100", "Police emergency"),
        number("Child Helpline", "1098", "Help for children in distress"),
        number("Women Helpline", "1091", "Help for women in distress"),
        number("Senior Citizen Helpline", "14567", "Help for elderly citizens"),
    ]
}

pub fn nearby_searches() -> Vec<NearbySearch> {
    [
        ("Hospitals", "hospital"),
        ("Pharmacies", "pharmacy"),
        ("Urgent Care", "urgent+care"),
        ("Clinics", "clinic"),
    ]
    .into_iter()
    .map(|(label, query)| NearbySearch {
        label: label.to_string(),
        url: format!("https://www.google.com/maps/search/{}+near+me", query),
    })
    .collect()
}

#[async_trait]
impl ProfileServiceTrait for ProfileService {
    fn validate_update_request(&self, request: &UpdateProfileRequest) -> Result<(), ServiceError> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::Validation(validation_message(&errors)));
        }

        if let Some(dob) = request.date_of_birth {
            if dob > Utc::now().date_naive() {
                return Err(ServiceError::Validation(
                    "date_of_birth: Date of birth cannot be in the future".to_string(),
                ));
            }
            if dob < earliest_birth_date() {
                return Err(ServiceError::Validation(
                    "date_of_birth: Date of birth cannot be before 1900".to_string(),
                ));
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: Uuid) -> Result<Profile, ServiceError> {
        self.find_profile(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", user_id))
    }

    #[instrument(skip(self, request))]
    async fn update_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<Profile, ServiceError> {
        self.validate_update_request(&request)?;

        let profile = Profile {
            full_name: clean_text(request.full_name),
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            phone_number: clean_text(request.phone_number),
            emergency_contact_name: clean_text(request.emergency_contact_name),
            emergency_contact_phone: clean_text(request.emergency_contact_phone),
            blood_type: request.blood_type,
            allergies: clean_list(request.allergies),
            chronic_conditions: clean_list(request.chronic_conditions),
            ..Profile::empty(user_id)
        };

        let stored = self
            .profiles
            .upsert(conversions::convert_to_data_profile_upsert(profile))
            .await?;
        debug!("Profile saved for user {}", user_id);

        conversions::convert_to_domain_profile(stored).map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn emergency_info(&self, user_id: Uuid) -> Result<EmergencyInfo, ServiceError> {
        let profile = self.find_profile(user_id).await?;

        let emergency_contact = profile.as_ref().and_then(|p| {
            match (&p.emergency_contact_name, &p.emergency_contact_phone) {
                (Some(name), Some(phone)) => Some(EmergencyContact {
                    name: name.clone(),
                    phone: phone.clone(),
                }),
                _ => None,
            }
        });

        let medical_info = profile
            .map(|p| MedicalInfo {
                blood_type: p.blood_type,
                allergies: p.allergies,
                chronic_conditions: p.chronic_conditions,
            })
            .unwrap_or_default();

        let profile_incomplete = medical_info.blood_type.is_none()
            || medical_info.allergies.is_empty()
            || medical_info.chronic_conditions.is_empty();

        Ok(EmergencyInfo {
            emergency_services: emergency_services(),
            helplines: helplines(),
            emergency_contact,
            medical_info,
            profile_incomplete,
            nearby: nearby_searches(),
        })
    }
}

/// Create a profile service over the given repositories
pub fn create_profile_service(repositories: &Repositories) -> Arc<dyn ProfileServiceTrait + Send + Sync> {
    Arc::new(ProfileService::new(repositories.profiles.clone()))
}
