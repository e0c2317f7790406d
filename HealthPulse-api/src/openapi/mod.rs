use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use health_pulse_domain::auth::{Claims, UserInfo};
use health_pulse_domain::entities::{
    AbnormalReadingRequest, AiInsight, AlertSeverity, AlertType, ChatMessage, ChatRequest, ChatRole,
    CreateHealthMetricRequest, CreateMedicationLogRequest, CreateMedicationRequest, EmergencyContact,
    EmergencyInfo, EmergencyNumber, GeneratedAlert, GeneratedInsight, HealthAlert, HealthAnalysis, HealthMetric,
    InsightType, MedicalInfo, Medication, MedicationFrequency, MedicationLog, MedicationLogStatus, MetricPoint,
    MetricSnapshot, MetricType, MetricsOverview, NearbySearch, Profile, ReadingAssessment,
    SetMedicationActiveRequest, Trend, UpdateProfileRequest,
};

use crate::api::handlers::health::{ComponentHealthStatus, ComponentStatus, HealthResponse};
use crate::entities::common::{
    AlertListResponse, InsightListResponse, MedicationListResponse, MedicationLogListResponse, MetricListResponse,
};
use crate::entities::{
    AlertListQuery, AnalysisResponse, DashboardResponse, ErrorResponse, ListQuery, MedicationListQuery,
    MetricListQuery, ReadingCheckResponse,
};

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer scheme referenced as `jwt_auth` by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,
        health_pulse_domain::auth::auth_info,

        crate::api::handlers::profile::get_profile,
        crate::api::handlers::profile::update_profile,
        crate::api::handlers::profile::get_emergency_info,

        crate::api::handlers::metrics::list_metrics,
        crate::api::handlers::metrics::create_metric,
        crate::api::handlers::metrics::get_metrics_overview,
        crate::api::handlers::metrics::delete_metric,

        crate::api::handlers::medications::list_medications,
        crate::api::handlers::medications::create_medication,
        crate::api::handlers::medications::set_medication_active,
        crate::api::handlers::medications::delete_medication,
        crate::api::handlers::medications::list_medication_logs,
        crate::api::handlers::medications::log_medication,

        crate::api::handlers::alerts::list_alerts,
        crate::api::handlers::alerts::mark_alert_read,
        crate::api::handlers::alerts::resolve_alert,
        crate::api::handlers::alerts::delete_alert,

        crate::api::handlers::insights::list_insights,
        crate::api::handlers::insights::mark_insight_read,

        crate::api::handlers::analysis::analyze_health,
        crate::api::handlers::analysis::check_abnormal_readings,
        crate::api::handlers::chat::chat_health,
        crate::api::handlers::dashboard::get_dashboard
    ),
    components(
        schemas(
            // Envelopes
            ErrorResponse,
            MetricListResponse,
            MedicationListResponse,
            MedicationLogListResponse,
            AlertListResponse,
            InsightListResponse,
            AnalysisResponse,
            ReadingCheckResponse,
            DashboardResponse,
            ListQuery,
            MetricListQuery,
            MedicationListQuery,
            AlertListQuery,

            // Health
            HealthResponse,
            ComponentStatus,
            ComponentHealthStatus,

            // Auth
            UserInfo,
            Claims,

            // Records
            Profile,
            UpdateProfileRequest,
            EmergencyInfo,
            EmergencyContact,
            EmergencyNumber,
            MedicalInfo,
            NearbySearch,
            HealthMetric,
            CreateHealthMetricRequest,
            MetricType,
            MetricsOverview,
            MetricSnapshot,
            MetricPoint,
            Trend,
            Medication,
            CreateMedicationRequest,
            SetMedicationActiveRequest,
            MedicationFrequency,
            MedicationLog,
            CreateMedicationLogRequest,
            MedicationLogStatus,
            HealthAlert,
            AlertType,
            AlertSeverity,
            AiInsight,
            InsightType,
            HealthAnalysis,
            GeneratedInsight,
            GeneratedAlert,
            AbnormalReadingRequest,
            ReadingAssessment,
            ChatRequest,
            ChatMessage,
            ChatRole
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "Authentication", description = "Token identity"),
        (name = "profile", description = "Profile and emergency information"),
        (name = "metrics", description = "Vital-sign measurements"),
        (name = "medications", description = "Medications and dose logs"),
        (name = "alerts", description = "Health alerts"),
        (name = "insights", description = "Generated insights"),
        (name = "analysis", description = "Health scoring and reading checks"),
        (name = "chat", description = "Streamed assistant chat"),
        (name = "dashboard", description = "Home screen aggregate")
    ),
    info(
        title = "HealthPulse API",
        version = "0.1.0",
        description = "API for tracking vital signs and medications, with generated insights and alerts",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "HealthPulse API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        for name in ["health", "metrics", "medications", "alerts", "chat", "dashboard"] {
            assert!(tags.iter().any(|tag| tag.name == name), "missing tag {}", name);
        }

        let paths = &openapi.paths.paths;
        for path in [
            "/health",
            "/auth/info",
            "/api/v1/profile",
            "/api/v1/emergency",
            "/api/v1/metrics",
            "/api/v1/metrics/overview",
            "/api/v1/metrics/{id}",
            "/api/v1/medications/{id}/logs",
            "/api/v1/alerts/{id}/resolve",
            "/api/v1/insights/{id}/read",
            "/api/v1/analyze-health",
            "/api/v1/check-abnormal-readings",
            "/api/v1/chat-health",
            "/api/v1/dashboard",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_is_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.unwrap();
        assert!(components.security_schemes.contains_key("jwt_auth"));
        assert!(components.schemas.contains_key("MetricListResponse"));
    }
}
