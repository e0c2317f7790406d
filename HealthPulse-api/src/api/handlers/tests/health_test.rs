use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};

use health_pulse_domain::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use health_pulse_domain::services::Repositories;

use super::TestApp;
use crate::api::state::AppState;

#[derive(Debug)]
struct TestMockHealthService {
    status: SystemStatus,
    components: HashMap<String, HealthComponent>,
}

impl TestMockHealthService {
    fn new() -> Self {
        let components = ["database", "api"]
            .into_iter()
            .map(|name| (name.to_string(), HealthComponent { status: ComponentStatus::Ok, details: None }))
            .collect();
        Self { status: SystemStatus::Ok, components }
    }

    fn with_component(mut self, name: &str, status: ComponentStatus, details: &str) -> Self {
        self.components
            .insert(name.to_string(), HealthComponent { status, details: Some(details.to_string()) });
        self
    }

    fn with_status(mut self, status: SystemStatus) -> Self {
        self.status = status;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for TestMockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        SystemHealth { status: self.status, components: self.components.clone() }
    }

    async fn check_database_status(&self) -> HealthComponent {
        self.components["database"].clone()
    }
}

fn app_with(service: TestMockHealthService) -> TestApp {
    let mut state = AppState::new(&Repositories::in_memory(), None);
    state.health = Arc::new(service);
    TestApp::from_state(state)
}

#[tokio::test]
async fn test_healthy_system_returns_ok() {
    let app = app_with(TestMockHealthService::new());
    let (status, body) = app.json(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
    assert!(body["version"].is_string());
    assert!(body["components"].get("additional").is_none());
}

#[tokio::test]
async fn test_degraded_system_returns_503() {
    let app = app_with(
        TestMockHealthService::new()
            .with_component("llm", ComponentStatus::Degraded, "Language model is not configured")
            .with_status(SystemStatus::Degraded),
    );
    let (status, body) = app.json(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["additional"]["llm"]["status"], "degraded");
}

#[tokio::test]
async fn test_failed_database_returns_500() {
    let app = app_with(
        TestMockHealthService::new()
            .with_component("database", ComponentStatus::Error, "Database connection error")
            .with_status(SystemStatus::Error),
    );
    let (status, body) = app.json(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["components"]["database"]["message"], "Database connection error");
}

#[tokio::test]
async fn test_real_service_without_pool_is_degraded() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["components"]["database"]["status"], "degraded");
    assert_eq!(body["components"]["additional"]["llm"]["status"], "degraded");
}
