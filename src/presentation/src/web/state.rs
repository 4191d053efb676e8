//! Application state for the Axum server

use application::agent_service::AgentService;
use application::command_runner::CommandRunner;
use domain::services::{CommandExecutor, CompletionService};
use domain::Lexicon;
use shared::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::session::SessionRegistry;

/// Shared by all handlers. Conversation state lives in per-session agents.
#[derive(Clone)]
pub struct AppState {
    pub completion: Option<Arc<dyn CompletionService>>,
    pub executor: Option<Arc<dyn CommandExecutor>>,
    pub lexicon: Arc<Lexicon>,
    pub runner: CommandRunner,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// `completion` is `None` when the backend could not be configured; the
    /// conversational routes then fail while health and execute keep working.
    pub fn new(
        completion: Option<Arc<dyn CompletionService>>,
        executor: Option<Arc<dyn CommandExecutor>>,
    ) -> Self {
        let lexicon = Arc::new(Lexicon::standard());
        Self {
            runner: application::create_runner(executor.clone(), lexicon.clone()),
            completion,
            executor,
            lexicon,
            sessions: SessionRegistry::default(),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn agent_available(&self) -> bool {
        self.completion.is_some()
    }

    pub fn engine_available(&self) -> bool {
        self.executor.is_some()
    }

    fn require_completion(&self) -> Result<Arc<dyn CompletionService>> {
        self.completion
            .clone()
            .ok_or_else(|| Error::Configuration("Agent not initialized".to_string()))
    }

    /// The agent owned by session `id`, created on first use.
    pub async fn agent(&self, id: &str) -> Result<Arc<Mutex<AgentService>>> {
        let completion = self.require_completion()?;
        let executor = self.executor.clone();
        let lexicon = self.lexicon.clone();
        Ok(self
            .sessions
            .get_or_create(id, move || AgentService::new(completion, executor, lexicon))
            .await)
    }

    /// The agent of session `id` if one was already created. Read-only routes
    /// use this so that looking never registers a session.
    pub async fn existing_agent(&self, id: &str) -> Result<Option<Arc<Mutex<AgentService>>>> {
        self.require_completion()?;
        Ok(self.sessions.get(id).await)
    }
}
