use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

pub const MAX_CHAT_MESSAGE_CHARS: usize = 8000;

/// Conversation so far, oldest message first
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ChatRequest {
    #[validate(
        length(min = 1, message = "At least one message is required"),
        custom = "validate_message_lengths"
    )]
    pub messages: Vec<ChatMessage>,
}

fn validate_message_lengths(messages: &[ChatMessage]) -> Result<(), ValidationError> {
    if messages.iter().any(|m| m.content.chars().count() > MAX_CHAT_MESSAGE_CHARS) {
        let mut error = ValidationError::new("length");
        error.message = Some(format!("Messages cannot exceed {} characters", MAX_CHAT_MESSAGE_CHARS).into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: String) -> ChatMessage {
        ChatMessage { role: ChatRole::User, content }
    }

    #[test]
    fn test_chat_request_validation() {
        assert!(ChatRequest { messages: vec![message("Hi".to_string())] }.validate().is_ok());
        assert!(ChatRequest { messages: vec![] }.validate().is_err());
        let long = "a".repeat(MAX_CHAT_MESSAGE_CHARS + 1);
        assert!(ChatRequest { messages: vec![message(long)] }.validate().is_err());
    }
}
