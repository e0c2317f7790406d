use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use health_pulse_domain::auth::{auth_info, auth_middleware, configure_security};
use health_pulse_domain::llm::create_language_model_from_env;
use health_pulse_domain::services::Repositories;

use crate::api::handlers::{alerts, analysis, chat, dashboard, health, insights, medications, metrics, profile};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router over the configured storage and language model
pub async fn create_app() -> Router {
    debug!("Creating application router");

    let language_model = create_language_model_from_env();
    match &language_model {
        Some(model) => info!("Language model enabled: {}", model.model_name()),
        None => warn!("No language model API key set, analysis falls back to rules and chat is disabled"),
    }

    let state = AppState::new(&Repositories::detect(), language_model);
    create_app_with_state(state)
}

/// Build the router around already wired services
pub fn create_app_with_state(state: AppState) -> Router {
    // Specific routes before parametrized ones
    let api_routes = Router::new()
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/emergency", get(profile::get_emergency_info))
        .route("/metrics/overview", get(metrics::get_metrics_overview))
        .route("/metrics", get(metrics::list_metrics).post(metrics::create_metric))
        .route("/metrics/:id", delete(metrics::delete_metric))
        .route(
            "/medications",
            get(medications::list_medications).post(medications::create_medication),
        )
        .route(
            "/medications/:id",
            patch(medications::set_medication_active).delete(medications::delete_medication),
        )
        .route(
            "/medications/:id/logs",
            get(medications::list_medication_logs).post(medications::log_medication),
        )
        .route("/alerts", get(alerts::list_alerts))
        .route("/alerts/:id", delete(alerts::delete_alert))
        .route("/alerts/:id/read", post(alerts::mark_alert_read))
        .route("/alerts/:id/resolve", post(alerts::resolve_alert))
        .route("/insights", get(insights::list_insights))
        .route("/insights/:id/read", post(insights::mark_insight_read))
        .route("/analyze-health", post(analysis::analyze_health))
        .route("/check-abnormal-readings", post(analysis::check_abnormal_readings))
        .route("/chat-health", post(chat::chat_health))
        .route("/dashboard", get(dashboard::get_dashboard))
        .layer(middleware::from_fn(auth_middleware));

    debug!("API routes configured");

    let auth_routes = Router::new()
        .route("/auth/info", get(auth_info))
        .layer(middleware::from_fn(auth_middleware));

    let public_routes = Router::new().route("/health", get(health::health_check));

    let app = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .with_state(state)
        .merge(configure_swagger_routes());

    debug!("Swagger UI merged");

    let app = configure_security(app).layer(TraceLayer::new_for_http());
    debug!("Security configuration applied");

    health::initialize_server_start_time();
    app
}
