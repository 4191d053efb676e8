//! Conversational orchestrator.
//!
//! Owns the conversation window and the structure registry for one session and
//! drives prompt building, completion, extraction and validation. Every public
//! operation reports failure as data (a failed result or a typed error); none
//! of them panic on upstream or engine faults.

use domain::entities::{
    ConversationHistory, ConversationTurn, ExecutionReport, GeneratedCommand, GenerationResult,
    MolecularStructure, PromptMessage, Role,
};
use domain::entities::conversation::PROMPT_CONTEXT_TURNS;
use domain::services::{CommandExecutor, CompletionService};
use domain::Lexicon;
use infrastructure::command_extractor::CommandExtractor;
use infrastructure::prompt_engineer::PromptEngineer;
use infrastructure::script_writer;
use serde::Serialize;
use serde_json::{json, Value};
use shared::error::{Error, Result};
use shared::types::StructureName;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command_corrector::CommandCorrector;
use crate::command_runner::CommandRunner;
use crate::command_validator::CommandValidator;

const HELP_TEXT: &str = "molscribe: natural-language PyMOL assistant

Command line:
  molscribe --pdb 6HRE --obj tau [--copies N --step A --axis x|y|z] [--extra TEXT] [--out script.pml] [--execute]
  molscribe --request \"show the protein as cartoon colored by secondary structure\" [--execute]
  molscribe --interactive [--load-pdb ID] [--load-file PATH]
  molscribe --web [--bind 127.0.0.1:5001]

Interactive commands:
  help     this text
  clear    forget the conversation, keep loaded structures
  quit     leave (also: exit)
  anything else is sent to the model as a request

HTTP (under /api):
  POST /chat {message, context?}     GET /health    POST /clear    GET /history
  POST /execute {commands, retry_on_error?}
  POST /structures {pdb_id | file_path, name?}    GET /structures
";

#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub success: bool,
    pub structure_name: String,
    pub load_command: String,
    pub structure: MolecularStructure,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptOutcome {
    #[serde(flatten)]
    pub generation: GenerationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

pub struct AgentService {
    completion: Arc<dyn CompletionService>,
    prompts: PromptEngineer,
    extractor: CommandExtractor,
    validator: CommandValidator,
    runner: CommandRunner,
    history: ConversationHistory,
    structures: BTreeMap<StructureName, MolecularStructure>,
}

impl AgentService {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        executor: Option<Arc<dyn CommandExecutor>>,
        lexicon: Arc<Lexicon>,
    ) -> Self {
        let validator = CommandValidator::new(lexicon.clone());
        let corrector = CommandCorrector::new(lexicon);
        Self {
            completion,
            prompts: PromptEngineer::new(),
            extractor: CommandExtractor::default(),
            runner: CommandRunner::new(executor, validator.clone(), corrector),
            validator,
            history: ConversationHistory::default(),
            structures: BTreeMap::new(),
        }
    }

    pub fn model(&self) -> &str {
        self.completion.model()
    }

    pub fn engine_available(&self) -> bool {
        self.runner.has_engine()
    }

    /// Conversational generation. Upstream failures come back as `success: false`.
    pub async fn generate(&mut self, request: &str, context: Option<&Value>) -> GenerationResult {
        let request = request.trim();
        if request.is_empty() {
            return GenerationResult::failed(
                Error::InvalidArguments("request must not be empty".to_string()).to_string(),
            );
        }

        let registry: Vec<&MolecularStructure> = self.structures.values().collect();
        let user_prompt = self.prompts.conversational(request, context, &registry);

        let mut messages: Vec<PromptMessage> = self
            .history
            .recent(PROMPT_CONTEXT_TURNS)
            .map(ConversationTurn::to_message)
            .collect();
        messages.push(PromptMessage::user(user_prompt));

        let raw = match self
            .completion
            .complete(self.prompts.conversational_system_prompt(), &messages)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "error generating PyMOL code");
                return GenerationResult::failed(e.to_string());
            }
        };
        tracing::info!(model = %self.model(), "raw model response: {}", raw);

        let commands: Vec<GeneratedCommand> = self
            .extractor
            .extract(&raw)
            .into_iter()
            .map(|line| {
                let validation = self.validator.validate(&line);
                if !validation.valid {
                    tracing::warn!(
                        command = %line,
                        message = %validation.message,
                        "command validation failed"
                    );
                }
                GeneratedCommand::new(line, validation)
            })
            .collect();
        tracing::info!(count = commands.len(), "extracted commands");

        self.history.push(ConversationTurn::new(Role::User, request));
        self.history.push(ConversationTurn::new(Role::Assistant, raw.clone()));

        GenerationResult::succeeded(raw, commands, self.completion.model())
    }

    /// Register a structure by PDB id or file path (exactly one), loading it
    /// into the engine when one is attached.
    pub async fn load_structure(
        &mut self,
        source_id: Option<&str>,
        file_path: Option<&Path>,
        name: Option<&str>,
    ) -> Result<LoadOutcome> {
        let source_id = source_id.map(str::trim).filter(|s| !s.is_empty());
        let name = name.map(str::trim).filter(|s| !s.is_empty());

        let structure = match (source_id, file_path) {
            (Some(id), None) => MolecularStructure::from_source_id(id, name),
            (None, Some(path)) => {
                if !path.exists() {
                    return Err(Error::NotFound(format!("File not found: {}", path.display())));
                }
                MolecularStructure::from_file(path, name)
            }
            (Some(_), Some(_)) => {
                return Err(Error::InvalidArguments(
                    "Provide either a PDB id or a file path, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::InvalidArguments(
                    "Either file_path or pdb_id must be provided".to_string(),
                ))
            }
        };

        let load_command = structure.load_command();
        if self.runner.has_engine() {
            let report = self.runner.run(&[load_command.clone()], true).await;
            if !report.success {
                let reason = report
                    .error
                    .or_else(|| report.errors.first().cloned())
                    .unwrap_or_else(|| "load failed".to_string());
                return Err(Error::Execution(reason));
            }
        }

        tracing::info!(name = %structure.name, "loaded structure");
        self.structures
            .insert(structure.name.clone(), structure.clone());
        Ok(LoadOutcome {
            success: true,
            structure_name: structure.name.clone(),
            load_command,
            structure,
        })
    }

    pub async fn execute_commands(
        &self,
        commands: &[String],
        retry_on_error: bool,
    ) -> ExecutionReport {
        self.runner.run(commands, retry_on_error).await
    }

    /// Empties the conversation window. The structure registry is kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("conversation history cleared");
    }

    pub fn history(&self) -> Vec<ConversationTurn> {
        self.history.iter().cloned().collect()
    }

    pub fn structures(&self) -> Vec<MolecularStructure> {
        self.structures.values().cloned().collect()
    }

    pub fn structure(&self, name: &str) -> Option<&MolecularStructure> {
        self.structures.get(name)
    }

    pub async fn analyze_structure(&mut self, name: &str) -> Result<GenerationResult> {
        let structure = self
            .structures
            .get(name)
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!("Structure '{}' not found in loaded structures", name))
            })?;

        let request = format!(
            "Analyze the molecular structure '{name}' and provide PyMOL commands that cover:
1. Structural classification and key features
2. A visualization strategy suited to it
3. Regions or domains worth highlighting
4. Commands for a comprehensive view
5. Useful analysis steps (alignments, distances, angles)

Structure details:
- Name: {name}
- PDB ID: {pdb}
- Description: {description}
- Chains: {chains}",
            name = structure.name,
            pdb = structure.source_id.as_deref().unwrap_or("N/A"),
            description = structure.description,
            chains = structure.chains_label(),
        );
        let context = json!({ "analysis_mode": true, "structure": structure });
        Ok(self.generate(&request, Some(&context)).await)
    }

    /// Generate a complete script for `request`, optionally saving it.
    /// A failed save is reported in the outcome, not raised.
    pub async fn create_visualization_script(
        &mut self,
        request: &str,
        output: Option<&Path>,
    ) -> ScriptOutcome {
        let prompt = format!(
            "Create a complete PyMOL script for: {}

Include, in order: structure loading, scene setup, styling and coloring,
camera positioning, rendering, and saving/exporting the result.",
            request.trim()
        );
        let generation = self.generate(&prompt, None).await;
        if !generation.success {
            return ScriptOutcome {
                generation,
                complete_script: None,
                script_file: None,
                save_error: None,
            };
        }

        let script =
            script_writer::render_script(
                request,
                self.completion.model(),
                &generation.command_lines(),
            );
        let mut save_error = None;
        if let Some(path) = output {
            if let Err(e) = std::fs::write(path, &script) {
                tracing::error!(path = %path.display(), error = %e, "error saving script");
                save_error = Some(e.to_string());
            } else {
                tracing::info!(path = %path.display(), "script saved");
            }
        }

        ScriptOutcome {
            generation,
            complete_script: Some(script),
            script_file: output.map(Path::to_path_buf),
            save_error,
        }
    }

    pub async fn help(&mut self, topic: Option<&str>) -> String {
        match topic.map(str::trim).filter(|t| !t.is_empty()) {
            None => HELP_TEXT.to_string(),
            Some(topic) => {
                let request =
                    format!("Provide detailed help and examples for PyMOL topic: {}", topic);
                let result = self.generate(&request, None).await;
                if result.success {
                    result.explanation
                } else {
                    result
                        .error
                        .unwrap_or_else(|| "Help information not available".to_string())
                }
            }
        }
    }
}
