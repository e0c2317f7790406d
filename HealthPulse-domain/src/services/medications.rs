use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::conversions;
use crate::entities::{
    CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationFrequency, MedicationLog,
    MedicationLogStatus, NewMedication, NewMedicationLog,
};
use super::errors::{validation_message, ServiceError};
use super::{effective_limit, Repositories, SharedMedicationRepository};

/// Schedule used when a regular medication is added without times
const DEFAULT_TIME_OF_DAY: &str = "08:00";

/// Trait for medication service operations
#[async_trait]
pub trait MedicationServiceTrait: Send + Sync {
    /// Check a create request and turn it into what gets stored
    fn validate_create_request(&self, request: &CreateMedicationRequest) -> Result<NewMedication, ServiceError>;

    /// Add a medication. New medications are active.
    async fn create_medication(&self, user_id: Uuid, request: CreateMedicationRequest) -> Result<Medication, ServiceError>;

    /// The caller's medications, newest first
    async fn list_medications(
        &self,
        user_id: Uuid,
        active: Option<bool>,
        limit: Option<usize>,
    ) -> Result<Vec<Medication>, ServiceError>;

    /// Switch a medication on or off
    async fn set_medication_active(&self, user_id: Uuid, id: Uuid, is_active: bool) -> Result<Medication, ServiceError>;

    /// Delete a medication and its logs
    async fn delete_medication(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError>;

    /// Record what happened to a scheduled dose
    async fn log_medication(
        &self,
        user_id: Uuid,
        medication_id: Uuid,
        request: CreateMedicationLogRequest,
    ) -> Result<MedicationLog, ServiceError>;

    /// Dose logs for one medication, newest first
    async fn list_medication_logs(
        &self,
        user_id: Uuid,
        medication_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<MedicationLog>, ServiceError>;
}

/// Medication service for domain logic
pub struct MedicationService {
    medications: SharedMedicationRepository,
}

impl MedicationService {
    pub fn new(medications: SharedMedicationRepository) -> Self {
        Self { medications }
    }

    async fn ensure_exists(&self, user_id: Uuid, medication_id: Uuid) -> Result<(), ServiceError> {
        self.medications
            .get_by_id(&user_id.to_string(), &medication_id.to_string())
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Medication", medication_id))
    }
}

pub(crate) fn convert_medications(
    rows: Vec<health_pulse_data::models::Medication>,
) -> Result<Vec<Medication>, ServiceError> {
    rows.into_iter()
        .map(conversions::convert_to_domain_medication)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::Repository)
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

#[async_trait]
impl MedicationServiceTrait for MedicationService {
    fn validate_create_request(&self, request: &CreateMedicationRequest) -> Result<NewMedication, ServiceError> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::Validation(validation_message(&errors)));
        }

        let name = request.name.trim();
        let dosage = request.dosage.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name: Name is required".to_string()));
        }
        if dosage.is_empty() {
            return Err(ServiceError::Validation("dosage: Dosage is required".to_string()));
        }

        let start_date = request.start_date.unwrap_or_else(|| Utc::now().date_naive());
        if let Some(end_date) = request.end_date {
            if end_date < start_date {
                return Err(ServiceError::Validation(
                    "end_date: End date cannot be before the start date".to_string(),
                ));
            }
        }

        let time_of_day = if request.time_of_day.is_empty() && request.frequency != MedicationFrequency::AsNeeded {
            vec![DEFAULT_TIME_OF_DAY.to_string()]
        } else {
            request.time_of_day.clone()
        };

        Ok(NewMedication {
            name: name.to_string(),
            dosage: dosage.to_string(),
            frequency: request.frequency,
            time_of_day,
            start_date,
            end_date: request.end_date,
            instructions: optional_text(&request.instructions),
            prescribing_doctor: optional_text(&request.prescribing_doctor),
        })
    }

    #[instrument(skip(self, request))]
    async fn create_medication(&self, user_id: Uuid, request: CreateMedicationRequest) -> Result<Medication, ServiceError> {
        let medication = self.validate_create_request(&request)?;
        let stored = self
            .medications
            .create(conversions::convert_to_data_medication_request(user_id, medication))
            .await?;
        debug!("Added medication {}", stored.id);
        conversions::convert_to_domain_medication(stored).map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn list_medications(
        &self,
        user_id: Uuid,
        active: Option<bool>,
        limit: Option<usize>,
    ) -> Result<Vec<Medication>, ServiceError> {
        let rows = self
            .medications
            .list_for_user(&user_id.to_string(), active, Some(effective_limit(limit)))
            .await?;
        convert_medications(rows)
    }

    #[instrument(skip(self))]
    async fn set_medication_active(&self, user_id: Uuid, id: Uuid, is_active: bool) -> Result<Medication, ServiceError> {
        let updated = self
            .medications
            .set_active(&user_id.to_string(), &id.to_string(), is_active)
            .await?
            .ok_or_else(|| ServiceError::not_found("Medication", id))?;
        conversions::convert_to_domain_medication(updated).map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn delete_medication(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if self.medications.delete(&user_id.to_string(), &id.to_string()).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Medication", id))
        }
    }

    #[instrument(skip(self, request))]
    async fn log_medication(
        &self,
        user_id: Uuid,
        medication_id: Uuid,
        request: CreateMedicationLogRequest,
    ) -> Result<MedicationLog, ServiceError> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::Validation(validation_message(&errors)));
        }

        let taken_at = match (request.status, request.taken_at) {
            (MedicationLogStatus::Pending, Some(_)) => {
                return Err(ServiceError::Validation(
                    "taken_at: A pending dose cannot have a taken time".to_string(),
                ));
            }
            (MedicationLogStatus::Taken, None) => Some(Utc::now()),
            (_, taken_at) => taken_at,
        };

        self.ensure_exists(user_id, medication_id).await?;

        let log = NewMedicationLog {
            medication_id,
            scheduled_time: request.scheduled_time,
            taken_at,
            status: request.status,
            notes: optional_text(&request.notes),
        };
        let stored = self
            .medications
            .create_log(conversions::convert_to_data_medication_log_request(user_id, log))
            .await?;
        conversions::convert_to_domain_medication_log(stored).map_err(ServiceError::Repository)
    }

    #[instrument(skip(self))]
    async fn list_medication_logs(
        &self,
        user_id: Uuid,
        medication_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<MedicationLog>, ServiceError> {
        self.ensure_exists(user_id, medication_id).await?;
        let rows = self
            .medications
            .list_logs(&user_id.to_string(), &medication_id.to_string(), Some(effective_limit(limit)))
            .await?;
        rows.into_iter()
            .map(conversions::convert_to_domain_medication_log)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Repository)
    }
}

/// Create a medication service over the given repositories
pub fn create_medication_service(repositories: &Repositories) -> Arc<dyn MedicationServiceTrait + Send + Sync> {
    Arc::new(MedicationService::new(repositories.medications.clone()))
}
