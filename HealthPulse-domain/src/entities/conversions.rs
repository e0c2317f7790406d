use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use health_pulse_data::models as data;
use health_pulse_data::models::format_timestamp;

use crate::entities::{
    AiInsight, GeneratedInsight, HealthAlert, HealthMetric, Medication, MedicationLog, NewHealthAlert,
    NewHealthMetric, NewMedication, NewMedicationLog, Profile,
};

/// Conversion functions between domain entities and data models.
/// Names follow `convert_to_[target_layer]_[model_name]`.
///
/// Data models keep ids, timestamps and enums as text; a value that fails
/// to parse means the stored row is corrupt and is reported as an error.
pub type ConversionResult<T> = Result<T, String>;

/// Parse a stored id
pub fn parse_string_to_uuid(id: &str) -> ConversionResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

fn parse_optional_uuid(id: Option<&str>) -> ConversionResult<Option<Uuid>> {
    id.map(parse_string_to_uuid).transpose()
}

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(value: &str) -> ConversionResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp: {}", value))
}

fn parse_optional_timestamp(value: Option<&str>) -> ConversionResult<Option<DateTime<Utc>>> {
    value.map(parse_timestamp).transpose()
}

/// Parse a stored `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> ConversionResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| format!("Invalid date: {}", value))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Empty lists are stored as NULL
fn to_optional_list(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Convert from data model to domain entity for a profile
pub fn convert_to_domain_profile(profile: data::Profile) -> ConversionResult<Profile> {
    Ok(Profile {
        id: parse_string_to_uuid(&profile.id)?,
        full_name: profile.full_name,
        date_of_birth: profile.date_of_birth.as_deref().map(parse_date).transpose()?,
        gender: profile.gender,
        phone_number: profile.phone_number,
        emergency_contact_name: profile.emergency_contact_name,
        emergency_contact_phone: profile.emergency_contact_phone,
        blood_type: profile.blood_type,
        allergies: profile.allergies.unwrap_or_default(),
        chronic_conditions: profile.chronic_conditions.unwrap_or_default(),
        created_at: parse_timestamp(&profile.created_at)?,
        updated_at: parse_timestamp(&profile.updated_at)?,
    })
}

/// Convert a cleaned-up profile to the data layer's upsert request
pub fn convert_to_data_profile_upsert(profile: Profile) -> data::UpsertProfileRequest {
    data::UpsertProfileRequest {
        id: profile.id.to_string(),
        full_name: profile.full_name,
        date_of_birth: profile.date_of_birth.map(format_date),
        gender: profile.gender,
        phone_number: profile.phone_number,
        emergency_contact_name: profile.emergency_contact_name,
        emergency_contact_phone: profile.emergency_contact_phone,
        blood_type: profile.blood_type,
        allergies: to_optional_list(profile.allergies),
        chronic_conditions: to_optional_list(profile.chronic_conditions),
    }
}

/// Convert from data model to domain entity for a metric
pub fn convert_to_domain_metric(metric: data::HealthMetric) -> ConversionResult<HealthMetric> {
    Ok(HealthMetric {
        id: parse_string_to_uuid(&metric.id)?,
        user_id: parse_string_to_uuid(&metric.user_id)?,
        metric_type: metric.metric_type.parse()?,
        value: metric.value,
        unit: metric.unit,
        systolic: metric.systolic,
        diastolic: metric.diastolic,
        notes: metric.notes,
        recorded_at: parse_timestamp(&metric.recorded_at)?,
        created_at: parse_timestamp(&metric.created_at)?,
    })
}

/// Build the data layer's create request for a validated metric
pub fn convert_to_data_metric_request(user_id: Uuid, metric: NewHealthMetric) -> data::CreateHealthMetricRequest {
    data::CreateHealthMetricRequest {
        user_id: user_id.to_string(),
        metric_type: metric.metric_type.to_string(),
        value: metric.value,
        unit: metric.metric_type.unit().to_string(),
        systolic: metric.systolic,
        diastolic: metric.diastolic,
        notes: metric.notes,
        recorded_at: format_timestamp(metric.recorded_at),
    }
}

/// Convert from data model to domain entity for a medication
pub fn convert_to_domain_medication(medication: data::Medication) -> ConversionResult<Medication> {
    Ok(Medication {
        id: parse_string_to_uuid(&medication.id)?,
        user_id: parse_string_to_uuid(&medication.user_id)?,
        name: medication.name,
        dosage: medication.dosage,
        frequency: medication.frequency.parse()?,
        time_of_day: medication.time_of_day,
        start_date: parse_date(&medication.start_date)?,
        end_date: medication.end_date.as_deref().map(parse_date).transpose()?,
        instructions: medication.instructions,
        prescribing_doctor: medication.prescribing_doctor,
        is_active: medication.is_active,
        created_at: parse_timestamp(&medication.created_at)?,
        updated_at: parse_timestamp(&medication.updated_at)?,
    })
}

/// Build the data layer's create request for a validated medication
pub fn convert_to_data_medication_request(user_id: Uuid, medication: NewMedication) -> data::CreateMedicationRequest {
    data::CreateMedicationRequest {
        user_id: user_id.to_string(),
        name: medication.name,
        dosage: medication.dosage,
        frequency: medication.frequency.to_string(),
        time_of_day: medication.time_of_day,
        start_date: format_date(medication.start_date),
        end_date: medication.end_date.map(format_date),
        instructions: medication.instructions,
        prescribing_doctor: medication.prescribing_doctor,
    }
}

/// Convert from data model to domain entity for a medication log
pub fn convert_to_domain_medication_log(log: data::MedicationLog) -> ConversionResult<MedicationLog> {
    Ok(MedicationLog {
        id: parse_string_to_uuid(&log.id)?,
        user_id: parse_string_to_uuid(&log.user_id)?,
        medication_id: parse_string_to_uuid(&log.medication_id)?,
        scheduled_time: parse_timestamp(&log.scheduled_time)?,
        taken_at: parse_optional_timestamp(log.taken_at.as_deref())?,
        status: log.status.parse()?,
        notes: log.notes,
        created_at: parse_timestamp(&log.created_at)?,
    })
}

/// Build the data layer's create request for a validated medication log
pub fn convert_to_data_medication_log_request(user_id: Uuid, log: NewMedicationLog) -> data::CreateMedicationLogRequest {
    data::CreateMedicationLogRequest {
        user_id: user_id.to_string(),
        medication_id: log.medication_id.to_string(),
        scheduled_time: format_timestamp(log.scheduled_time),
        taken_at: log.taken_at.map(format_timestamp),
        status: log.status.to_string(),
        notes: log.notes,
    }
}

/// Convert from data model to domain entity for an alert
pub fn convert_to_domain_alert(alert: data::HealthAlert) -> ConversionResult<HealthAlert> {
    Ok(HealthAlert {
        id: parse_string_to_uuid(&alert.id)?,
        user_id: parse_string_to_uuid(&alert.user_id)?,
        alert_type: alert.alert_type.parse()?,
        severity: alert.severity.parse()?,
        title: alert.title,
        message: alert.message,
        related_metric_id: parse_optional_uuid(alert.related_metric_id.as_deref())?,
        related_medication_id: parse_optional_uuid(alert.related_medication_id.as_deref())?,
        is_read: alert.is_read,
        is_resolved: alert.is_resolved,
        created_at: parse_timestamp(&alert.created_at)?,
        resolved_at: parse_optional_timestamp(alert.resolved_at.as_deref())?,
    })
}

/// Build the data layer's create request for a new alert
pub fn convert_to_data_alert_request(user_id: Uuid, alert: NewHealthAlert) -> data::CreateHealthAlertRequest {
    data::CreateHealthAlertRequest {
        user_id: user_id.to_string(),
        alert_type: alert.alert_type.to_string(),
        severity: alert.severity.to_string(),
        title: alert.title,
        message: alert.message,
        related_metric_id: alert.related_metric_id.map(|id| id.to_string()),
        related_medication_id: alert.related_medication_id.map(|id| id.to_string()),
    }
}

/// Convert from data model to domain entity for an insight
pub fn convert_to_domain_insight(insight: data::AiInsight) -> ConversionResult<AiInsight> {
    Ok(AiInsight {
        id: parse_string_to_uuid(&insight.id)?,
        user_id: parse_string_to_uuid(&insight.user_id)?,
        insight_type: insight.insight_type.parse()?,
        title: insight.title,
        content: insight.content,
        recommendations: insight.recommendations,
        confidence_score: insight.confidence_score,
        is_read: insight.is_read,
        created_at: parse_timestamp(&insight.created_at)?,
    })
}

/// Build the data layer's create request for a generated insight
pub fn convert_to_data_insight_request(user_id: Uuid, insight: &GeneratedInsight) -> data::CreateAiInsightRequest {
    data::CreateAiInsightRequest {
        user_id: user_id.to_string(),
        insight_type: insight.insight_type.to_string(),
        title: insight.title.clone(),
        content: insight.content.clone(),
        recommendations: insight.recommendations.clone(),
        confidence_score: Some(insight.confidence_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AlertSeverity, AlertType, MetricType};

    #[test]
    fn test_parse_string_to_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_string_to_uuid(&id.to_string()).unwrap(), id);
        assert!(parse_string_to_uuid("not-a-uuid").unwrap_err().contains("Invalid UUID"));
    }

    #[test]
    fn test_profile_lists_map_null_to_empty() {
        let id = Uuid::new_v4();
        let stored = data::Profile {
            id: id.to_string(),
            full_name: None,
            date_of_birth: Some("1985-02-28".to_string()),
            gender: None,
            phone_number: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            blood_type: None,
            allergies: None,
            chronic_conditions: Some(vec!["asthma".to_string()]),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2024-01-02T00:00:00.000000Z".to_string(),
        };
        let profile = convert_to_domain_profile(stored).unwrap();
        assert!(profile.allergies.is_empty());
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(1985, 2, 28));

        let upsert = convert_to_data_profile_upsert(profile);
        assert_eq!(upsert.allergies, None);
        assert_eq!(upsert.chronic_conditions, Some(vec!["asthma".to_string()]));
        assert_eq!(upsert.date_of_birth.as_deref(), Some("1985-02-28"));
    }

    #[test]
    fn test_metric_with_unknown_type_is_rejected() {
        let stored = data::HealthMetric {
            id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            metric_type: "glucose".to_string(),
            value: 5.4,
            unit: "mmol/L".to_string(),
            systolic: None,
            diastolic: None,
            notes: None,
            recorded_at: "2024-01-01T00:00:00.000000Z".to_string(),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
        };
        assert!(convert_to_domain_metric(stored.clone()).is_err());

        let valid = data::HealthMetric { metric_type: "heart_rate".to_string(), ..stored };
        assert_eq!(convert_to_domain_metric(valid).unwrap().metric_type, MetricType::HeartRate);
    }

    #[test]
    fn test_alert_request_uses_wire_names() {
        let request = convert_to_data_alert_request(
            Uuid::nil(),
            NewHealthAlert {
                alert_type: AlertType::MedicationReminder,
                severity: AlertSeverity::Low,
                title: "Medication Reminders Active".to_string(),
                message: "You have 1 active medication".to_string(),
                related_metric_id: None,
                related_medication_id: None,
            },
        );
        assert_eq!(request.alert_type, "medication_reminder");
        assert_eq!(request.severity, "low");
        assert_eq!(request.user_id, Uuid::nil().to_string());
    }
}
