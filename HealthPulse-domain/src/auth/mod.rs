//! Authentication for the HealthPulse API
//!
//! Identity is delegated: an external provider issues HS256 bearer tokens and
//! this module only verifies them.

#[cfg(feature = "with-axum")]
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "with-axum")]
use tracing::{debug, error, warn};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[cfg(feature = "with-axum")]
use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};

pub mod logging;
pub mod token;

pub use token::{generate_token, validate_token, SecurityError};

/// Claims carried by the identity provider's access tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject, the user's id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Issued at (as timestamp), zero when the provider leaves it out
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// The caller, as established by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserInfo {
    pub user_id: Uuid,
    pub roles: Vec<String>,
    pub email: Option<String>,
    /// Always "jwt" for now
    pub auth_source: String,
}

impl UserInfo {
    pub fn from_claims(user_id: Uuid, claims: &Claims) -> Self {
        Self {
            user_id,
            roles: vec![claims.role.clone().unwrap_or_else(|| "user".to_string())],
            email: claims.email.clone(),
            auth_source: "jwt".to_string(),
        }
    }
}

#[cfg(feature = "with-axum")]
fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "unauthorized", "message": message })),
    )
        .into_response()
}

#[cfg(feature = "with-axum")]
fn bearer_token(req: &Request<Body>) -> Result<&str, &'static str> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;
    let value = value.to_str().map_err(|_| "Invalid Authorization header format")?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or("Authorization header does not contain Bearer token")
}

/// Authentication middleware for protected routes
#[cfg(feature = "with-axum")]
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Response {
    let request_path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let start_time = std::time::Instant::now();

    let failure = |details: String, user_id: Option<&str>| {
        AuthEvent::new(AuthEventType::TokenValidation, user_id, false)
            .with_details(details)
            .with_resource(request_path.clone())
            .with_user_agent(user_agent.clone())
            .with_duration(start_time.elapsed().as_millis() as u64)
            .with_auth_method("jwt")
    };

    let token = match bearer_token(&req) {
        Ok(token) => token,
        Err(reason) => {
            debug!("{}", reason);
            log_auth_event(failure(reason.to_string(), None));
            return unauthorized(reason);
        }
    };

    match token::validate_token(token) {
        Ok((claims, user_id)) => {
            debug!("Token validated for user: {}", user_id);
            let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                .with_details("JWT validation successful")
                .with_resource(request_path.clone())
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            req.extensions_mut().insert(UserInfo::from_claims(user_id, &claims));
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(SecurityError::ConfigError(e)) => {
            error!("Authentication is not configured: {}", e);
            log_auth_event(failure("Authentication is not configured".to_string(), None));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "server_error",
                    "message": "Authentication is not configured"
                })),
            )
                .into_response()
        }
        Err(SecurityError::TokenExpired) => {
            warn!("Expired token");
            log_auth_event(failure("JWT token has expired".to_string(), None));
            unauthorized("Token has expired")
        }
        Err(e) => {
            warn!("Token rejected: {}", e);
            log_auth_event(failure(e.to_string(), None));
            unauthorized("Invalid token")
        }
    }
}

/// Add CORS and security response headers to the whole application
#[cfg(all(feature = "with-axum", feature = "with-web"))]
pub fn configure_security(app: axum::Router) -> axum::Router {
    use axum::http::{HeaderName, HeaderValue, Method};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=(), interest-cohort=()"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-permitted-cross-domain-policies"),
            HeaderValue::from_static("none"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ));

    app.layer(cors).layer(security_headers)
}

/// Auth info endpoint
#[cfg(feature = "with-axum")]
#[cfg_attr(feature = "with-api", utoipa::path(
    get,
    path = "/auth/info",
    responses(
        (status = 200, description = "Authenticated identity", body = UserInfo),
        (status = 401, description = "Missing or invalid token", body = serde_json::Value)
    ),
    tag = "Authentication",
    security(
        ("jwt_auth" = [])
    )
))]
pub async fn auth_info(Extension(user_info): Extension<UserInfo>) -> Json<UserInfo> {
    Json(user_info)
}

#[cfg(all(test, feature = "with-axum", feature = "with-web"))]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/auth/info", get(auth_info))
            .layer(middleware::from_fn(auth_middleware))
    }

    fn request(authorization: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/auth/info");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
        let response = app().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_non_bearer_header_is_unauthorized() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
        let response = app().oneshot(request(Some("Basic abc".to_string()))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, Some("asha@example.com")).unwrap();

        let response = app().oneshot(request(Some(format!("Bearer {}", token)))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let info: UserInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(info.user_id, user_id);
        assert_eq!(info.email.as_deref(), Some("asha@example.com"));
        assert_eq!(info.auth_source, "jwt");
    }
}
