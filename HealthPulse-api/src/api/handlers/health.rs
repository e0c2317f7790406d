use std::sync::Once;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use health_pulse_domain::health::{HealthComponent, SystemHealth, SystemStatus};

use crate::api::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Unix timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: ComponentStatus,
    /// Value of `APP_ENV`
    pub environment: String,
}

/// Status of individual system components
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub database: ComponentHealthStatus,
    pub api: ComponentHealthStatus,
    /// Everything else, keyed by component name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<serde_json::Value>,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&HealthComponent> for ComponentHealthStatus {
    fn from(component: &HealthComponent) -> Self {
        Self {
            status: component.status.as_str().to_string(),
            message: component.details.clone(),
        }
    }
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time used for `uptime`
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(unix_now());
    });
}

fn component_status(health: &SystemHealth, name: &str) -> ComponentHealthStatus {
    health
        .components
        .get(name)
        .map(ComponentHealthStatus::from)
        .unwrap_or(ComponentHealthStatus { status: "ok".to_string(), message: None })
}

/// Shape the domain health report for the wire
pub fn build_health_response(health: &SystemHealth) -> HealthResponse {
    let now = unix_now();

    let additional: serde_json::Map<String, serde_json::Value> = health
        .components
        .iter()
        .filter(|(name, _)| name.as_str() != "database" && name.as_str() != "api")
        .map(|(name, component)| {
            (
                name.clone(),
                serde_json::json!({
                    "status": component.status.as_str(),
                    "message": component.details,
                }),
            )
        })
        .collect();

    HealthResponse {
        status: health.status.as_str().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime: SERVER_START_TIME.get().map(|&start| now.saturating_sub(start)),
        components: ComponentStatus {
            database: component_status(health, "database"),
            api: component_status(health, "api"),
            additional: (!additional.is_empty()).then(|| additional.into()),
        },
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    }
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let health = state.health.get_system_health().await;
    let code = match health.status {
        SystemStatus::Ok => StatusCode::OK,
        SystemStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        SystemStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (code, Json(build_health_response(&health)))
}
