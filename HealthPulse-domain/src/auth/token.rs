use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::auth::logging::log_token_issued;
use crate::auth::Claims;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Bad signature, bad structure or a failed claim check
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The subject is not a user id
    #[error("Token subject is not a valid user id")]
    InvalidSubject,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

const DEFAULT_EXPIRATION_MINUTES: i64 = 60;

fn jwt_secret() -> Result<String, SecurityError> {
    env::var("JWT_SECRET")
        .ok()
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| {
            error!("JWT_SECRET environment variable not found");
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn access_token_lifetime() -> Duration {
    let minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_EXPIRATION_MINUTES);
    Duration::minutes(minutes)
}

/// Mint an access token the way the identity provider does.
/// Used by tests and local tooling; the service itself never logs anyone in.
pub fn generate_token(user_id: Uuid, email: Option<&str>) -> Result<String, SecurityError> {
    let secret = jwt_secret()?;

    let now = Utc::now();
    let expiration = now + access_token_lifetime();

    let claims = Claims {
        sub: user_id.to_string(),
        iss: optional_env("JWT_ISSUER"),
        aud: optional_env("JWT_AUDIENCE"),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
        email: email.map(str::to_string),
        role: Some("authenticated".to_string()),
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::InvalidToken(e.to_string())
        })?;

    log_token_issued(&user_id.to_string());
    debug!("Token expiration: {}", expiration);

    Ok(token)
}

/// Validate a bearer token and return its claims along with the user id
pub fn validate_token(token: &str) -> Result<(Claims, Uuid), SecurityError> {
    let secret = jwt_secret()?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);
    if let Some(issuer) = optional_env("JWT_ISSUER") {
        validation.set_issuer(&[issuer]);
    }
    match optional_env("JWT_AUDIENCE") {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            ErrorKind::InvalidSignature => SecurityError::InvalidToken("Invalid signature".to_string()),
            ErrorKind::InvalidIssuer => SecurityError::InvalidToken("Invalid issuer".to_string()),
            ErrorKind::InvalidAudience => SecurityError::InvalidToken("Invalid audience".to_string()),
            _ => SecurityError::InvalidToken(e.to_string()),
        })?;

    let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| SecurityError::InvalidSubject)?;
    Ok((token_data.claims, user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key_for_testing_only";

    fn setup_test_env() {
        env::set_var("JWT_SECRET", TEST_SECRET);
    }

    fn sign(claims: &Claims) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes())).unwrap()
    }

    fn claims(sub: &str, exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: sub.to_string(),
            iss: None,
            aud: None,
            iat: now,
            exp: now + exp_offset,
            email: None,
            role: None,
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        setup_test_env();
        let user_id = Uuid::new_v4();

        let token = generate_token(user_id, Some("asha@example.com")).unwrap();
        assert!(!token.is_empty());

        let (claims, validated) = validate_token(&token).unwrap();
        assert_eq!(validated, user_id);
        assert_eq!(claims.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn test_expired_token() {
        setup_test_env();
        let token = sign(&claims(&Uuid::new_v4().to_string(), -3600));

        match validate_token(&token) {
            Err(SecurityError::TokenExpired) => {}
            other => panic!("Expected TokenExpired but got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token() {
        setup_test_env();
        assert!(matches!(validate_token("invalid.token.format"), Err(SecurityError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_signature() {
        setup_test_env();
        let token = encode(
            &Header::default(),
            &claims(&Uuid::new_v4().to_string(), 3600),
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();
        assert!(matches!(validate_token(&token), Err(SecurityError::InvalidToken(_))));
    }

    #[test]
    fn test_token_without_issued_at_is_accepted() {
        setup_test_env();
        let user_id = Uuid::new_v4();
        let payload = serde_json::json!({
            "sub": user_id.to_string(),
            "exp": Utc::now().timestamp() + 3600,
        });
        let token = encode(&Header::default(), &payload, &EncodingKey::from_secret(TEST_SECRET.as_bytes())).unwrap();

        let (claims, validated) = validate_token(&token).unwrap();
        assert_eq!(validated, user_id);
        assert_eq!(claims.iat, 0);
    }

    #[test]
    fn test_subject_must_be_uuid() {
        setup_test_env();
        let token = sign(&claims("not-a-uuid", 3600));
        assert!(matches!(validate_token(&token), Err(SecurityError::InvalidSubject)));
    }
}
