use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::entities::ChatMessage;
use super::sse::{SseDecoder, SseEvent};
use super::{LanguageModelClient, LlmConfig, LlmError, TextStream};

const CONNECT_TIMEOUT_SECONDS: u64 = 10;

/// Client for any provider exposing `/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        // No overall timeout here, streamed replies can outlive it
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    async fn post(&self, body: Value, timeout: Option<Duration>) -> Result<reqwest::Response, LlmError> {
        let mut request = self.client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            error!("Language model request failed: {}", e);
            LlmError::Http(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Language model API error {}: {}", status, body);
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        Ok(response)
    }
}

/// `choices[0].message.content` of a completion
fn message_content(completion: &Value) -> Result<&str, LlmError> {
    completion
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::InvalidResponse("completion has no message content".to_string()))
}

/// `choices[0].delta.content` of a streamed chunk, if any
pub(crate) fn parse_delta(payload: &str) -> Result<Option<String>, LlmError> {
    let chunk: Value = serde_json::from_str(payload)
        .map_err(|e| LlmError::InvalidResponse(format!("bad stream chunk: {}", e)))?;
    Ok(chunk
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string))
}

struct StreamState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turn an event-stream body into text deltas
fn text_deltas(response: reqwest::Response) -> TextStream {
    let state = StreamState {
        body: response.bytes_stream().map(|chunk| chunk.map(|b| b.to_vec())).boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(text) = state.pending.pop_front() {
                return Some((Ok(text), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for event in state.decoder.push(&chunk) {
                        match event {
                            SseEvent::Done => state.finished = true,
                            SseEvent::Data(payload) => match parse_delta(&payload) {
                                Ok(Some(text)) => state.pending.push_back(text),
                                Ok(None) => {}
                                Err(e) => {
                                    state.finished = true;
                                    state.pending.clear();
                                    return Some((Err(e), state));
                                }
                            },
                        }
                        if state.finished {
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    error!("Language model stream interrupted: {}", e);
                    state.finished = true;
                    return Some((Err(LlmError::Http(e.to_string())), state));
                }
                None => state.finished = true,
            }
        }
    })
    .boxed()
}

#[async_trait]
impl LanguageModelClient for OpenAiCompatibleClient {
    fn model_name(&self) -> String {
        self.config.model.clone()
    }

    #[instrument(skip(self, system, prompt), fields(model = %self.config.model))]
    async fn generate_json(&self, system: &str, prompt: &str) -> Result<Value, LlmError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.2,
        });

        let response = self.post(body, Some(Duration::from_secs(self.config.timeout_seconds))).await?;
        let completion: Value = response.json().await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = message_content(&completion)?;
        debug!("Language model returned {} characters", content.len());
        serde_json::from_str(content)
            .map_err(|e| LlmError::InvalidResponse(format!("content is not JSON: {}", e)))
    }

    #[instrument(skip(self, system, messages), fields(model = %self.config.model, turns = messages.len()))]
    async fn stream_chat(&self, system: &str, messages: &[ChatMessage]) -> Result<TextStream, LlmError> {
        let mut conversation = vec![json!({ "role": "system", "content": system })];
        conversation.extend(messages.iter().map(|m| json!({
            "role": m.role.as_str(),
            "content": m.content,
        })));

        let body = json!({
            "model": self.config.model,
            "messages": conversation,
            "stream": true,
        });

        let response = self.post(body, None).await?;
        Ok(text_deltas(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delta() {
        let chunk = r#"{"choices":[{"index":0,"delta":{"content":"Hello"}}]}"#;
        assert_eq!(parse_delta(chunk).unwrap(), Some("Hello".to_string()));

        let role_only = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_delta(role_only).unwrap(), None);

        assert!(matches!(parse_delta("not json"), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_message_content() {
        let completion = json!({ "choices": [{ "message": { "content": "{\"a\":1}" } }] });
        assert_eq!(message_content(&completion).unwrap(), "{\"a\":1}");
        assert!(message_content(&json!({ "choices": [] })).is_err());
    }
}
