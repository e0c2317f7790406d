// Handler tests run against the full router over in-memory repositories
mod analysis_test;
mod dashboard_test;
mod health_test;
mod records_test;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use health_pulse_domain::auth::generate_token;
use health_pulse_domain::llm::SharedLanguageModel;
use health_pulse_domain::services::Repositories;
use health_pulse_domain::testing::StaticLanguageModel;

use crate::api::routes::create_app_with_state;
use crate::api::state::AppState;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_only";

/// A router plus a bearer token for one fresh user
pub struct TestApp {
    router: Router,
    token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::from_state(AppState::new(&Repositories::in_memory(), None))
    }

    pub fn with_language_model(model: StaticLanguageModel) -> Self {
        let model: SharedLanguageModel = Arc::new(model);
        Self::from_state(AppState::new(&Repositories::in_memory(), Some(model)))
    }

    pub fn from_state(state: AppState) -> Self {
        std::env::set_var("JWT_SECRET", TEST_SECRET);
        let token = generate_token(Uuid::new_v4(), Some("test@example.com")).unwrap();
        Self { router: create_app_with_state(state), token }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    /// Send a request and decode the JSON body (Null when empty)
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.send(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

/// The JSON payloads of every `data:` line in an event stream body
pub fn sse_payloads(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}
