use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use shared::error::{Error, Result};
use shared::telemetry::TelemetryConfig;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    OpenAi,
    Ollama,
}

impl LlmBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" => Some(LlmBackend::OpenAi),
            "ollama" => Some(LlmBackend::Ollama),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::OpenAi,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "qwen2.5:7b-instruct".to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            timeout_seconds: 120,
        }
    }
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        match self.backend {
            LlmBackend::OpenAi => &self.openai_model,
            LlmBackend::Ollama => &self.ollama_model,
        }
    }

    pub fn set_model(&mut self, model: &str) {
        match self.backend {
            LlmBackend::OpenAi => self.openai_model = model.to_string(),
            LlmBackend::Ollama => self.ollama_model = model.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub executable: String,
    pub command_timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: "pymol".to_string(),
            command_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("molscribe.log")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub bind: String,
    /// Conversations kept at once; the least recently used one is dropped beyond this.
    pub max_sessions: usize,
    pub session_idle_seconds: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5001".to_string(),
            max_sessions: 256,
            session_idle_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

impl Config {
    /// Read `.env` (if present) and the process environment.
    pub fn load() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_defaults = LlmConfig::default();
        let llm = LlmConfig {
            backend: lookup("MOLSCRIBE_LLM_BACKEND")
                .and_then(|v| LlmBackend::parse(&v))
                .unwrap_or(llm_defaults.backend),
            openai_api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            openai_base_url: lookup("OPENAI_BASE_URL").unwrap_or(llm_defaults.openai_base_url),
            openai_model: lookup("OPENAI_MODEL").unwrap_or(llm_defaults.openai_model),
            ollama_base_url: lookup("OLLAMA_BASE_URL").unwrap_or(llm_defaults.ollama_base_url),
            ollama_model: lookup("BASE_MODEL").unwrap_or(llm_defaults.ollama_model),
            temperature: lookup("MOLSCRIBE_TEMPERATURE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(llm_defaults.temperature),
            max_tokens: lookup("MOLSCRIBE_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(llm_defaults.max_tokens),
            timeout_seconds: lookup("MOLSCRIBE_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(llm_defaults.timeout_seconds),
        };

        let engine_defaults = EngineConfig::default();
        let engine = EngineConfig {
            executable: lookup("PYMOL_EXECUTABLE").unwrap_or(engine_defaults.executable),
            command_timeout_seconds: lookup("MOLSCRIBE_EXEC_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(engine_defaults.command_timeout_seconds),
        };

        let logging_defaults = LoggingConfig::default();
        let logging = LoggingConfig {
            level: lookup("MOLSCRIBE_LOG_LEVEL").unwrap_or(logging_defaults.level),
            file: match lookup("MOLSCRIBE_LOG_FILE") {
                Some(path) if path.trim().is_empty() => None,
                Some(path) => Some(PathBuf::from(path)),
                None => logging_defaults.file,
            },
        };

        let web_defaults = WebConfig::default();
        let web = WebConfig {
            bind: lookup("MOLSCRIBE_WEB_BIND").unwrap_or(web_defaults.bind),
            max_sessions: lookup("MOLSCRIBE_WEB_MAX_SESSIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(web_defaults.max_sessions),
            session_idle_seconds: lookup("MOLSCRIBE_WEB_SESSION_IDLE_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(web_defaults.session_idle_seconds),
        };

        Self {
            llm,
            engine,
            logging,
            web,
        }
    }

    /// Reports a missing credential for the selected backend.
    pub fn validate(&self) -> Result<()> {
        if self.llm.backend == LlmBackend::OpenAi && self.llm.openai_api_key.is_none() {
            return Err(Error::Configuration(
                "OPENAI_API_KEY is not set. Export it or add it to a .env file.".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::Configuration(format!(
                "temperature {} is outside 0.0..=2.0",
                self.llm.temperature
            )));
        }
        Ok(())
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            level: self.logging.level.clone(),
            log_file: self.logging.file.clone(),
        }
    }
}
