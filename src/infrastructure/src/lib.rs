pub mod command_extractor;
pub mod config;
pub mod ollama_client;
pub mod openai_client;
pub mod prompt_engineer;
pub mod pymol_executor;
pub mod safety;
pub mod script_writer;

use async_trait::async_trait;
use domain::entities::PromptMessage;
use domain::services::CompletionService;
use shared::error::Result;

use config::{LlmBackend, LlmConfig};

/// Completion backends selectable at runtime.
#[derive(Clone)]
pub enum InferenceEngine {
    OpenAi(openai_client::OpenAiClient),
    Ollama(ollama_client::OllamaClient),
}

impl InferenceEngine {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match config.backend {
            LlmBackend::OpenAi => Ok(Self::OpenAi(openai_client::OpenAiClient::new(config)?)),
            LlmBackend::Ollama => Ok(Self::Ollama(ollama_client::OllamaClient::new(config)?)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            InferenceEngine::OpenAi(_) => "OpenAI",
            InferenceEngine::Ollama(_) => "Ollama",
        }
    }
}

#[async_trait]
impl CompletionService for InferenceEngine {
    async fn complete(&self, system: &str, messages: &[PromptMessage]) -> Result<String> {
        match self {
            InferenceEngine::OpenAi(client) => client.complete(system, messages).await,
            InferenceEngine::Ollama(client) => client.complete(system, messages).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            InferenceEngine::OpenAi(client) => client.model(),
            InferenceEngine::Ollama(client) => client.model(),
        }
    }
}
