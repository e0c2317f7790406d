use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use health_pulse_domain::services::Repositories;

use super::TestApp;
use crate::api::routes::create_app_with_state;
use crate::api::state::AppState;

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let router = create_app_with_state(AppState::new(&Repositories::in_memory(), None));
    let request = Request::builder().uri("/api/v1/metrics").body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_info_returns_identity() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::GET, "/auth/info", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "test@example.com");
}

#[tokio::test]
async fn test_profile_round_trip() {
    let app = TestApp::new();

    let (status, body) = app.json(Method::GET, "/api/v1/profile", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/v1/profile",
            Some(json!({
                "full_name": "Asha Rao",
                "blood_type": "O+",
                "allergies": ["penicillin", "  "],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allergies"], json!(["penicillin"]));

    let (status, body) = app.json(Method::GET, "/api/v1/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Asha Rao");

    let (status, body) = app.json(Method::GET, "/api/v1/emergency", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["medical_info"]["blood_type"], "O+");
    assert_eq!(body["profile_incomplete"], true);
}

#[tokio::test]
async fn test_metric_lifecycle() {
    let app = TestApp::new();

    let (status, created) = app
        .json(Method::POST, "/api/v1/metrics", Some(json!({ "metric_type": "heart_rate", "value": 72 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["unit"], "bpm");

    app.json(Method::POST, "/api/v1/metrics", Some(json!({ "metric_type": "steps", "value": 8000 })))
        .await;

    let (status, list) = app.json(Method::GET, "/api/v1/metrics?type=heart_rate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["id"], created["id"]);

    let (_, overview) = app.json(Method::GET, "/api/v1/metrics/overview", None).await;
    assert_eq!(overview["heart_rate_series"].as_array().unwrap().len(), 1);

    let id = created["id"].as_str().unwrap();
    let (status, _) = app.json(Method::DELETE, &format!("/api/v1/metrics/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.json(Method::DELETE, &format!("/api/v1/metrics/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blood_pressure_without_diastolic_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/metrics",
            Some(json!({ "metric_type": "blood_pressure", "systolic": 120 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_medication_lifecycle() {
    let app = TestApp::new();

    let (status, medication) = app
        .json(
            Method::POST,
            "/api/v1/medications",
            Some(json!({ "name": "Lisinopril", "dosage": "10mg", "frequency": "daily" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(medication["time_of_day"], json!(["08:00"]));
    assert_eq!(medication["is_active"], true);
    let id = medication["id"].as_str().unwrap().to_string();

    let (status, log) = app
        .json(
            Method::POST,
            &format!("/api/v1/medications/{}/logs", id),
            Some(json!({ "scheduled_time": "2024-05-01T08:00:00Z", "status": "taken" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(log["taken_at"].is_string());

    let (_, logs) = app.json(Method::GET, &format!("/api/v1/medications/{}/logs", id), None).await;
    assert_eq!(logs["count"], 1);

    let (status, updated) = app
        .json(Method::PATCH, &format!("/api/v1/medications/{}", id), Some(json!({ "is_active": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], false);

    let (_, active) = app.json(Method::GET, "/api/v1/medications?active=true", None).await;
    assert_eq!(active["count"], 0);

    let (status, _) = app.json(Method::DELETE, &format!("/api/v1/medications/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.json(Method::GET, &format!("/api/v1/medications/{}/logs", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_alert_lifecycle() {
    let app = TestApp::new();

    app.json(
        Method::POST,
        "/api/v1/check-abnormal-readings",
        Some(json!({ "metricType": "heart_rate", "value": 160 })),
    )
    .await;

    let (status, alerts) = app.json(Method::GET, "/api/v1/alerts?unresolved=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts["count"], 1);
    assert_eq!(alerts["data"][0]["title"], "Abnormal heart_rate Reading");
    let id = alerts["data"][0]["id"].as_str().unwrap().to_string();

    let (_, read) = app.json(Method::POST, &format!("/api/v1/alerts/{}/read", id), None).await;
    assert_eq!(read["is_read"], true);

    let (_, resolved) = app.json(Method::POST, &format!("/api/v1/alerts/{}/resolve", id), None).await;
    assert_eq!(resolved["is_resolved"], true);
    assert!(resolved["resolved_at"].is_string());

    let (_, open) = app.json(Method::GET, "/api/v1/alerts?unresolved=true", None).await;
    assert_eq!(open["count"], 0);
    let (_, all) = app.json(Method::GET, "/api/v1/alerts", None).await;
    assert_eq!(all["count"], 1);

    let (status, _) = app.json(Method::DELETE, &format!("/api/v1/alerts/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.json(Method::DELETE, &format!("/api/v1/alerts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_users_cannot_see_each_others_records() {
    let repositories = Repositories::in_memory();
    let owner = TestApp::from_state(AppState::new(&repositories, None));
    let other = TestApp::from_state(AppState::new(&repositories, None));

    let (_, created) = owner
        .json(Method::POST, "/api/v1/metrics", Some(json!({ "metric_type": "heart_rate", "value": 70 })))
        .await;
    let id = created["id"].as_str().unwrap();

    let (_, list) = other.json(Method::GET, "/api/v1/metrics", None).await;
    assert_eq!(list["count"], 0);

    let (status, _) = other.json(Method::DELETE, &format!("/api/v1/metrics/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
