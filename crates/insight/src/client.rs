//! Text-generation backends

use crate::{InsightError, Result};
use azdoc_common::InsightConfig;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One prompt/response exchange
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Anything that can turn a prompt into text
#[cfg_attr(test, mockall::automock)]
pub trait TextGenerator {
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Client for an OpenAI-compatible chat completions endpoint
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &InsightConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("azdoc/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InsightError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            "Sending {} byte prompt to {} ({})",
            request.prompt.len(),
            self.endpoint,
            self.model
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| InsightError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::Request(format!(
                "API returned status: {}",
                status
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| InsightError::Request(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(InsightError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.25,
            max_tokens: 10,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 10);
    }

    #[test]
    fn test_chat_response_tolerates_missing_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_client_builds_from_config() {
        let client = OpenAiClient::new(&InsightConfig::default(), "sk-test").unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
    }
}
