use async_trait::async_trait;
use domain::entities::PromptMessage;
use domain::services::CompletionService;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use shared::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Message,
    #[serde(default)]
    done: bool,
}

/// Local Ollama backend, speaking the `/api/chat` protocol.
#[derive(Clone)]
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            model: config.ollama_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

/// Ollama may answer with one JSON object or a stream of newline-delimited chunks.
fn collect_content(text: &str) -> String {
    let mut full_content = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(chunk) = serde_json::from_str::<ChatResponse>(line) {
            full_content.push_str(&chunk.message.content);
            if chunk.done {
                break;
            }
        }
    }
    full_content
}

#[async_trait]
impl CompletionService for OllamaClient {
    async fn complete(&self, system: &str, messages: &[PromptMessage]) -> Result<String> {
        let mut payload = Vec::with_capacity(messages.len() + 1);
        if !system.is_empty() {
            payload.push(Message {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        payload.extend(messages.iter().map(|m| Message {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        }));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: payload,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Ollama request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Ollama response unreadable: {}", e)))?;
        if !status.is_success() {
            return Err(Error::Upstream(format!("Ollama API error: {}", text)));
        }

        Ok(collect_content(&text))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
