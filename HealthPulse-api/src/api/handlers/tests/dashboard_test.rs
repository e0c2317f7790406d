use axum::http::{Method, StatusCode};
use serde_json::json;

use super::TestApp;

#[tokio::test]
async fn test_empty_dashboard() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::GET, "/api/v1/dashboard", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["profile"].is_null());
    assert_eq!(body["alerts"], json!([]));
    assert_eq!(body["medications"], json!([]));
    assert_eq!(body["metrics"]["latest"], json!([]));
}

#[tokio::test]
async fn test_dashboard_limits_sections() {
    let app = TestApp::new();

    app.json(Method::PUT, "/api/v1/profile", Some(json!({ "full_name": "Asha Rao" }))).await;
    for i in 0..7 {
        app.json(
            Method::POST,
            "/api/v1/medications",
            Some(json!({ "name": format!("Medication {}", i), "dosage": "5mg", "frequency": "daily" })),
        )
        .await;
        app.json(
            Method::POST,
            "/api/v1/check-abnormal-readings",
            Some(json!({ "metricType": "heart_rate", "value": 150 + i })),
        )
        .await;
    }
    app.json(Method::POST, "/api/v1/analyze-health", None).await;

    let (status, body) = app.json(Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["full_name"], "Asha Rao");
    assert_eq!(body["alerts"].as_array().unwrap().len(), 5);
    assert_eq!(body["medications"].as_array().unwrap().len(), 5);
    assert!(body["insights"].as_array().unwrap().len() <= 3);
    assert!(body["alerts"].as_array().unwrap().iter().all(|a| a["is_resolved"] == false));
}
