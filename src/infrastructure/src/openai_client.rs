//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use domain::entities::PromptMessage;
use domain::services::CompletionService;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use shared::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| Error::Configuration("OPENAI_API_KEY is not set".to_string()))?;
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Upstream(format!(
                "OpenAI request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            Error::Upstream(format!("OpenAI request failed: {}", err))
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, system: &str, messages: &[PromptMessage]) -> Result<String> {
        let mut payload = Vec::with_capacity(messages.len() + 1);
        payload.push(Message {
            role: "system",
            content: system,
        });
        payload.extend(messages.iter().map(|m| Message {
            role: m.role.as_str(),
            content: &m.content,
        }));

        let request = ChatRequest {
            model: &self.model,
            messages: payload,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, turns = messages.len(), "calling OpenAI");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("OpenAI API error {}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.map_send_error(e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| Error::Upstream("OpenAI returned no choices".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
