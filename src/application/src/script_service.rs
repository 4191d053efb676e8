use domain::entities::{ExecutionReport, PromptMessage};
use domain::services::CompletionService;
use infrastructure::prompt_engineer::{PromptEngineer, StructuredPrompt, StructuredRequest};
use infrastructure::safety::SafetyFilter;
use infrastructure::script_writer;
use shared::error::Result;
use std::path::Path;
use std::sync::Arc;

use crate::command_runner::CommandRunner;

/// Output of one strict generation.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub commands: Vec<String>,
    pub raw: String,
    pub prompt: StructuredPrompt,
}

/// The one-shot pipeline: structured prompt, single completion, whitelist filter.
pub struct ScriptService {
    completion: Arc<dyn CompletionService>,
    prompts: PromptEngineer,
    filter: SafetyFilter,
    runner: CommandRunner,
}

impl ScriptService {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        filter: SafetyFilter,
        runner: CommandRunner,
    ) -> Self {
        Self {
            completion,
            prompts: PromptEngineer::new(),
            filter,
            runner,
        }
    }

    pub fn model(&self) -> &str {
        self.completion.model()
    }

    /// Argument errors surface before the completion service is called.
    /// Zero surviving lines is `Error::EmptyOutput` with the raw response.
    pub async fn generate(&self, request: &StructuredRequest) -> Result<ScriptOutput> {
        let prompt = self.prompts.structured(request)?;
        tracing::debug!(plan = prompt.plan.len(), "built structured prompt");

        let raw = self
            .completion
            .complete(&prompt.system_prompt, &[PromptMessage::user(prompt.user_prompt.clone())])
            .await?;
        let raw = raw.trim().to_string();
        tracing::info!(model = %self.model(), "raw model response: {}", raw);

        let commands = self.filter.filter(&raw)?;
        tracing::info!(count = commands.len(), "validated commands");
        Ok(ScriptOutput {
            commands,
            raw,
            prompt,
        })
    }

    pub fn write(&self, path: &Path, commands: &[String]) -> Result<()> {
        script_writer::write_pml(path, commands)
    }

    pub fn engine_available(&self) -> bool {
        self.runner.has_engine()
    }

    /// Runs the filtered commands as-is; the strict pipeline does not self-correct.
    pub async fn execute(&self, commands: &[String]) -> ExecutionReport {
        self.runner.run(commands, false).await
    }
}
