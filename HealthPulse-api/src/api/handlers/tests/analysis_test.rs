use axum::http::{Method, StatusCode};
use serde_json::json;

use health_pulse_domain::testing::StaticLanguageModel;

use super::TestApp;

#[tokio::test]
async fn test_analyze_health_stores_insights() {
    let app = TestApp::new();
    for value in [72, 75, 70, 110] {
        app.json(Method::POST, "/api/v1/metrics", Some(json!({ "metric_type": "heart_rate", "value": value })))
            .await;
    }

    let (status, body) = app.json(Method::POST, "/api/v1/analyze-health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    // Mean of 81.75 bpm is in range: baseline 75 plus 5
    assert_eq!(body["analysis"]["overallHealthScore"], 80);
    assert!(body["analysis"].get("overall_health_score").is_none());

    let first = &body["analysis"]["insights"][0];
    assert_eq!(first["title"], "Heart Rate Monitoring");
    assert_eq!(first["confidenceScore"], 0.85);

    let alerts = body["analysis"]["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["title"], "Elevated Heart Rate");
    assert!(alerts.iter().all(|alert| alert["alertType"] == "abnormal_reading"));

    let generated = body["analysis"]["insights"].as_array().unwrap().len();
    let (_, insights) = app.json(Method::GET, "/api/v1/insights", None).await;
    assert_eq!(insights["count"], generated);

    let id = insights["data"][0]["id"].as_str().unwrap();
    let (status, read) = app.json(Method::POST, &format!("/api/v1/insights/{}/read", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["is_read"], true);
}

#[tokio::test]
async fn test_normal_reading_raises_no_alert() {
    let app = TestApp::new();
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/check-abnormal-readings",
            Some(json!({ "metricType": "oxygen_level", "value": 98 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["isAbnormal"], false);

    let (_, alerts) = app.json(Method::GET, "/api/v1/alerts", None).await;
    assert_eq!(alerts["count"], 0);
}

#[tokio::test]
async fn test_reading_check_uses_language_model_verdict() {
    let model = StaticLanguageModel::new().with_json(json!({
        "isAbnormal": true,
        "severity": "high",
        "reason": "Heart rate is unusually high for you.",
        "recommendations": ["Rest and re-measure in 15 minutes"],
        "requiresImmediateAttention": false
    }));
    let app = TestApp::with_language_model(model);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/check-abnormal-readings",
            Some(json!({ "metricType": "heart_rate", "value": 98 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["severity"], "high");

    let (_, alerts) = app.json(Method::GET, "/api/v1/alerts", None).await;
    assert_eq!(alerts["data"][0]["message"], "Heart rate is unusually high for you.");
    assert_eq!(alerts["data"][0]["severity"], "high");
}

#[tokio::test]
async fn test_model_failure_is_a_server_error() {
    let app = TestApp::with_language_model(StaticLanguageModel::new().unavailable());
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/check-abnormal-readings",
            Some(json!({ "metricType": "heart_rate", "value": 98 })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn test_reading_without_value_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .json(Method::POST, "/api/v1/check-abnormal-readings", Some(json!({ "metricType": "temperature" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
