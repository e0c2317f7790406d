use thiserror::Error;
use validator::ValidationErrors;

use health_pulse_data::repository::RepositoryError;

use crate::llm::LlmError;

/// Errors shared by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record is absent or belongs to another user
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage failed or returned a row that could not be read
    #[error("Repository error: {0}")]
    Repository(String),

    /// The language model is unavailable or replied with something unusable
    #[error("Language model error: {0}")]
    LanguageModel(String),
}

impl ServiceError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} not found: {}", what, id))
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ServiceError::Validation(msg),
            _ => ServiceError::Repository(err.to_string()),
        }
    }
}

impl From<LlmError> for ServiceError {
    fn from(err: LlmError) -> Self {
        ServiceError::LanguageModel(err.to_string())
    }
}

/// Flatten validator output into one message, `field: message; field: message`
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    // field_errors is a HashMap
    fields.sort();
    fields.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, max = 10))]
        count: u32,
    }

    #[test]
    fn test_validation_message_lists_every_field() {
        let errors = Sample { name: String::new(), count: 0 }.validate().unwrap_err();
        assert_eq!(validation_message(&errors), "count: Invalid count; name: Name is required");
    }

    #[test]
    fn test_repository_errors_map_by_kind() {
        let not_found: ServiceError = RepositoryError::NotFound("gone".to_string()).into();
        assert!(matches!(not_found, ServiceError::NotFound(_)));
        let lock: ServiceError = RepositoryError::Lock("poisoned".to_string()).into();
        assert!(matches!(lock, ServiceError::Repository(_)));
    }
}
