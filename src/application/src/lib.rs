pub mod agent_service;
pub mod command_corrector;
pub mod command_runner;
pub mod command_validator;
pub mod script_service;

use domain::services::{CommandExecutor, CompletionService};
use domain::Lexicon;
use infrastructure::config::Config;
use infrastructure::pymol_executor::PymolExecutor;
use infrastructure::safety::SafetyFilter;
use infrastructure::InferenceEngine;
use shared::error::Result;
use std::sync::Arc;

/// Completion backend selected by `MOLSCRIBE_LLM_BACKEND`.
pub fn create_completion_service(config: &Config) -> Result<Arc<dyn CompletionService>> {
    config.validate()?;
    let engine = InferenceEngine::from_config(&config.llm)?;
    tracing::info!(
        backend = engine.backend_name(),
        model = %engine.model(),
        "completion backend ready"
    );
    Ok(Arc::new(engine))
}

/// PyMOL executor, or `None` when the binary is not installed.
pub fn create_executor(config: &Config) -> Option<Arc<dyn CommandExecutor>> {
    PymolExecutor::detect(&config.engine).map(|e| Arc::new(e) as Arc<dyn CommandExecutor>)
}

pub fn create_runner(
    executor: Option<Arc<dyn CommandExecutor>>,
    lexicon: Arc<Lexicon>,
) -> command_runner::CommandRunner {
    command_runner::CommandRunner::new(
        executor,
        command_validator::CommandValidator::new(lexicon.clone()),
        command_corrector::CommandCorrector::new(lexicon),
    )
}

pub fn create_agent_service(
    completion: Arc<dyn CompletionService>,
    executor: Option<Arc<dyn CommandExecutor>>,
) -> agent_service::AgentService {
    agent_service::AgentService::new(completion, executor, Arc::new(Lexicon::standard()))
}

pub fn create_script_service(
    completion: Arc<dyn CompletionService>,
    executor: Option<Arc<dyn CommandExecutor>>,
) -> script_service::ScriptService {
    let runner = create_runner(executor, Arc::new(Lexicon::standard()));
    script_service::ScriptService::new(completion, SafetyFilter::default(), runner)
}
