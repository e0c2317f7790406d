// Test doubles for the domain layer
// Only available with the "mock" feature

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::entities::ChatMessage;
use crate::llm::{LanguageModelClient, LlmError, TextStream};

/// A language model that replays scripted output
#[derive(Debug, Default)]
pub struct StaticLanguageModel {
    json_reply: Option<Value>,
    chunks: Vec<String>,
    fail_after: Option<usize>,
    fail_immediately: bool,
    prompts: Mutex<Vec<String>>,
}

impl StaticLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `generate_json` with this value
    pub fn with_json(mut self, reply: Value) -> Self {
        self.json_reply = Some(reply);
        self
    }

    /// Stream these chunks from `stream_chat`
    pub fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    /// End the stream with an error once `count` chunks were sent
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Reject every request before producing output
    pub fn unavailable(mut self) -> Self {
        self.fail_immediately = true;
        self
    }

    /// System prompts and JSON prompts seen so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
    }

    fn unavailable_error() -> LlmError {
        LlmError::Api { status: 503, body: "model unavailable".to_string() }
    }
}

#[async_trait]
impl LanguageModelClient for StaticLanguageModel {
    fn model_name(&self) -> String {
        "static-test-model".to_string()
    }

    async fn generate_json(&self, _system: &str, prompt: &str) -> Result<Value, LlmError> {
        self.record(prompt);
        if self.fail_immediately {
            return Err(Self::unavailable_error());
        }
        self.json_reply
            .clone()
            .ok_or_else(|| LlmError::InvalidResponse("no scripted reply".to_string()))
    }

    async fn stream_chat(&self, system: &str, _messages: &[ChatMessage]) -> Result<TextStream, LlmError> {
        self.record(system);
        if self.fail_immediately {
            return Err(Self::unavailable_error());
        }

        let mut items: Vec<Result<String, LlmError>> = self.chunks.iter().cloned().map(Ok).collect();
        if let Some(count) = self.fail_after {
            items.truncate(count);
            items.push(Err(LlmError::Http("connection reset".to_string())));
        }
        Ok(stream::iter(items).boxed())
    }
}
