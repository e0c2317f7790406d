use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Bearer token checked on a protected route
    TokenValidation,
    /// Token minted locally for tests or tooling
    TokenIssued,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::TokenIssued => write!(f, "TOKEN_ISSUED"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User ID (if known)
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// User agent string from the client
    pub user_agent: Option<String>,
    pub success: bool,
    /// Additional details about the event
    pub details: Option<String>,
    /// Path being accessed
    pub resource: Option<String>,
    /// Time spent authenticating, in milliseconds
    pub duration_ms: Option<u64>,
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            user_agent: None,
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event. Failures go out at warn level.
pub fn log_auth_event(event: AuthEvent) {
    let user_id = event.user_id.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");
    let method = event.auth_method.as_deref().unwrap_or("-");
    let duration_ms = event.duration_ms.unwrap_or(0);

    if event.success {
        info!(
            event_type = %event.event_type,
            user_id,
            resource,
            auth_method = method,
            duration_ms,
            "AUTH-LOG [{}] [{}] [{}] {}",
            event.event_type,
            user_id,
            status,
            details
        );
    } else {
        warn!(
            event_type = %event.event_type,
            user_id,
            resource,
            auth_method = method,
            duration_ms,
            user_agent = event.user_agent.as_deref().unwrap_or("-"),
            "AUTH-LOG [{}] [{}] [{}] {}",
            event.event_type,
            user_id,
            status,
            details
        );
    }
}

/// Log a token minted by `generate_token`
pub fn log_token_issued(user_id: &str) {
    let event = AuthEvent::new(AuthEventType::TokenIssued, Some(user_id), true)
        .with_auth_method("jwt");
    log_auth_event(event);
}
