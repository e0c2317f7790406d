use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use health_pulse_domain::entities::{
    AiInsight, HealthAlert, HealthAnalysis, HealthMetric, Medication, MedicationLog, MetricType,
    MetricsOverview, Profile, ReadingAssessment,
};
use health_pulse_domain::services::ServiceError;

/// Error response format for the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "not_found".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => {
                warn!("Rejected request: {}", message);
                ErrorResponse::validation_error(message)
            }
            ServiceError::NotFound(message) => ErrorResponse::not_found(message),
            other => {
                error!("Request failed: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

/// A list of records
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    MetricListResponse = ListResponse<HealthMetric>,
    MedicationListResponse = ListResponse<Medication>,
    MedicationLogListResponse = ListResponse<MedicationLog>,
    AlertListResponse = ListResponse<HealthAlert>,
    InsightListResponse = ListResponse<AiInsight>
)]
pub struct ListResponse<T> {
    /// Number of items returned
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { count: data.len(), data }
    }
}

/// `POST /api/v1/analyze-health` response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: HealthAnalysis,
}

/// `POST /api/v1/check-abnormal-readings` response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingCheckResponse {
    pub success: bool,
    pub analysis: ReadingAssessment,
}

/// `GET /api/v1/dashboard` response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    /// Absent until the user saves a profile
    pub profile: Option<Profile>,
    pub metrics: MetricsOverview,
    /// Most recent unresolved alerts
    pub alerts: Vec<HealthAlert>,
    /// Active medications shown as reminders
    pub medications: Vec<Medication>,
    pub insights: Vec<AiInsight>,
}

/// Paging for plain lists
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListQuery {
    /// Maximum number of results (default: 100, max: 500)
    pub limit: Option<usize>,
}

/// Filters for the metric list
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MetricListQuery {
    /// Only this kind of measurement
    #[serde(rename = "type")]
    pub metric_type: Option<MetricType>,
    /// Maximum number of results (default: 100, max: 500)
    pub limit: Option<usize>,
}

/// Filters for the medication list
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MedicationListQuery {
    /// Only active (true) or inactive (false) medications
    pub active: Option<bool>,
    /// Maximum number of results (default: 100, max: 500)
    pub limit: Option<usize>,
}

/// Filters for the alert list
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AlertListQuery {
    /// Only alerts that are not resolved yet
    #[serde(default)]
    pub unresolved: bool,
    /// Maximum number of results (default: 100, max: 500)
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Validation("value: required".to_string()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("Metric not found".to_string()), StatusCode::NOT_FOUND),
            (ServiceError::Repository("disk full".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::LanguageModel("timeout".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ErrorResponse::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response = ErrorResponse::from(ServiceError::Repository("secret path /var/db".to_string()));
        assert_eq!(response.message, "An unexpected error occurred");
    }
}
