//! End-to-end tests over a SQLite-backed router

use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use health_pulse_api::api::routes::create_app_with_state;
use health_pulse_api::api::AppState;
use health_pulse_data::database::create_in_memory_pool;
use health_pulse_data::repository::{
    HealthAlertRepository, HealthMetricRepository, InsightRepository, MedicationRepository, ProfileRepository,
};
use health_pulse_domain::auth::generate_token;
use health_pulse_domain::services::Repositories;

static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
    std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
}

fn sqlite_app() -> Router {
    initialize();
    let pool = create_in_memory_pool().unwrap();
    let repositories = Repositories {
        profiles: Arc::new(ProfileRepository::with_pool(pool.clone())),
        metrics: Arc::new(HealthMetricRepository::with_pool(pool.clone())),
        medications: Arc::new(MedicationRepository::with_pool(pool.clone())),
        alerts: Arc::new(HealthAlertRepository::with_pool(pool.clone())),
        insights: Arc::new(InsightRepository::with_pool(pool)),
    };
    create_app_with_state(AppState::new(&repositories, None))
}

async fn call(app: &Router, token: &str, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn test_health_tracking_flow_on_sqlite() {
    let app = sqlite_app();
    let token = generate_token(Uuid::new_v4(), None).unwrap();

    let (status, _) = call(
        &app,
        &token,
        Method::PUT,
        "/api/v1/profile",
        Some(json!({ "full_name": "Asha Rao", "date_of_birth": "1980-04-12", "chronic_conditions": ["hypertension"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for (systolic, diastolic) in [(150, 95), (148, 92), (152, 96)] {
        let (status, _) = call(
            &app,
            &token,
            Method::POST,
            "/api/v1/metrics",
            Some(json!({ "metric_type": "blood_pressure", "systolic": systolic, "diastolic": diastolic })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, metrics) = call(&app, &token, Method::GET, "/api/v1/metrics?type=blood_pressure&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["count"], 2);

    let (status, analysis) = call(&app, &token, Method::POST, "/api/v1/analyze-health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!analysis["analysis"]["insights"].as_array().unwrap().is_empty());

    let (_, insights) = call(&app, &token, Method::GET, "/api/v1/insights", None).await;
    assert!(insights["count"].as_u64().unwrap() >= 1);

    let (status, dashboard) = call(&app, &token, Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["profile"]["chronic_conditions"], json!(["hypertension"]));
    assert!(dashboard["insights"].as_array().unwrap().len() <= 3);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = sqlite_app();
    let (status, body) = call(&app, "not-a-jwt", Method::GET, "/api/v1/dashboard", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = sqlite_app();
    let request = Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["info"]["title"], "HealthPulse API");
    assert!(doc["paths"].get("/api/v1/chat-health").is_some());
}
