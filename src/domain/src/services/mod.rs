use async_trait::async_trait;
use shared::error::Result;

use crate::entities::PromptMessage;

/// Stateless text-completion backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// `messages` is oldest-first and ends with the new user instruction.
    /// Failures of any kind, timeouts included, come back as `Error::Upstream`.
    async fn complete(&self, system: &str, messages: &[PromptMessage]) -> Result<String>;

    fn model(&self) -> &str;
}

/// Runs one instruction line against the visualization engine.
///
/// A rejected command is `Error::Execution` with the engine's message.
/// Any other error means the engine itself is unusable and aborts the run.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, line: &str) -> Result<()>;
}
