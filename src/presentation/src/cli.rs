//! Command-line front end.
//!
//! Four modes share one [`CliApp`]: the strict one-shot script pipeline (the
//! default), a single conversational `--request`, the `--interactive` loop and
//! the `--web` service. [`CliApp::run`] returns the process exit code.

use application::agent_service::AgentService;
use application::script_service::ScriptService;
use clap::Parser;
use colored::Colorize;
use domain::services::{CommandExecutor, CompletionService};
use infrastructure::config::Config;
use infrastructure::prompt_engineer::StructuredRequest;
use infrastructure::pymol_executor::locate_executable;
use shared::confirmation::ask_confirmation;
use shared::error::{Error, Result};
use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::web::session::SessionRegistry;
use crate::web::state::AppState;
use crate::web::AxumServer;

#[path = "cli/display.rs"]
pub mod display;

/// Commands shown after the script is written.
const PREVIEW_LINES: usize = 8;

#[derive(Parser, Clone, Debug)]
#[command(name = "molscribe")]
#[command(about = "Generate, validate and run PyMOL commands from natural language")]
pub struct Cli {
    /// PDB id to fetch (e.g. 6HRE)
    #[arg(long)]
    pub pdb: Option<String>,

    /// Object name inside PyMOL
    #[arg(long, default_value = "obj")]
    pub obj: String,

    /// Total number of units for aggregation
    #[arg(long)]
    pub copies: Option<u32>,

    /// Translation per copy in Å
    #[arg(long, allow_negative_numbers = true)]
    pub step: Option<f64>,

    /// Axis for translation (x, y or z)
    #[arg(long)]
    pub axis: Option<String>,

    /// Freeform extra instruction (e.g. 'color chain A green')
    #[arg(long)]
    pub extra: Option<String>,

    /// Completion model id, overrides the configured one
    #[arg(long)]
    pub model: Option<String>,

    /// Output .pml path
    #[arg(long, default_value = "script.pml")]
    pub out: PathBuf,

    /// Execute the generated commands when PyMOL is available
    #[arg(long)]
    pub execute: bool,

    /// One conversational request
    #[arg(long)]
    pub request: Option<String>,

    /// Conversational loop
    #[arg(long)]
    pub interactive: bool,

    /// Register a PDB structure before the conversation starts
    #[arg(long)]
    pub load_pdb: Option<String>,

    /// Register a local structure file before the conversation starts
    #[arg(long)]
    pub load_file: Option<PathBuf>,

    /// Start the HTTP service
    #[arg(long)]
    pub web: bool,

    /// Bind address for --web, overrides MOLSCRIBE_WEB_BIND
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Script,
    Request,
    Interactive,
    Web,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.web {
            Mode::Web
        } else if self.interactive {
            Mode::Interactive
        } else if self.request.is_some() {
            Mode::Request
        } else {
            Mode::Script
        }
    }

    pub fn structured_request(&self) -> StructuredRequest {
        StructuredRequest {
            object: self.obj.clone(),
            source_id: self.pdb.clone(),
            copies: self.copies,
            step: self.step,
            axis: self.axis.clone(),
            extra: self.extra.clone(),
        }
    }
}

pub struct CliApp {
    config: Config,
    completion: Option<Arc<dyn CompletionService>>,
    executor: Option<Arc<dyn CommandExecutor>>,
    detect_engine: bool,
    scripted_inputs: Option<VecDeque<String>>,
}

impl CliApp {
    /// Services are built from `config` when a mode needs them.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            completion: None,
            executor: None,
            detect_engine: true,
            scripted_inputs: None,
        }
    }

    /// Use the given services instead of building them from configuration.
    pub fn with_services(
        config: Config,
        completion: Arc<dyn CompletionService>,
        executor: Option<Arc<dyn CommandExecutor>>,
    ) -> Self {
        Self {
            config,
            completion: Some(completion),
            executor,
            detect_engine: false,
            scripted_inputs: None,
        }
    }

    /// Feed the interactive loop from a queue instead of stdin. An empty queue reads as EOF.
    pub fn with_scripted_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripted_inputs = Some(inputs.into_iter().map(Into::into).collect());
        self
    }

    pub async fn run(&mut self, cli: Cli) -> i32 {
        if let Some(model) = &cli.model {
            self.config.llm.set_model(model);
        }
        if let Some(bind) = &cli.bind {
            self.config.web.bind = bind.clone();
        }

        let mode = cli.mode();
        tracing::debug!(?mode, "starting");
        let outcome = match mode {
            Mode::Script => self.run_script(&cli).await,
            Mode::Request => self.run_request(&cli).await,
            Mode::Interactive => self.run_interactive(&cli).await,
            Mode::Web => self.run_web().await,
        };

        match outcome {
            Ok(()) => 0,
            Err(err) => {
                tracing::error!(error = %err, "command failed");
                display::error(&err);
                err.kind().exit_code()
            }
        }
    }

    fn completion(&self) -> Result<Arc<dyn CompletionService>> {
        match &self.completion {
            Some(completion) => Ok(completion.clone()),
            None => application::create_completion_service(&self.config),
        }
    }

    fn executor(&self) -> Option<Arc<dyn CommandExecutor>> {
        if self.detect_engine {
            application::create_executor(&self.config)
        } else {
            self.executor.clone()
        }
    }

    fn script_service(&self) -> Result<ScriptService> {
        Ok(application::create_script_service(
            self.completion()?,
            self.executor(),
        ))
    }

    fn agent_service(&self) -> Result<AgentService> {
        Ok(application::create_agent_service(
            self.completion()?,
            self.executor(),
        ))
    }

    async fn run_script(&self, cli: &Cli) -> Result<()> {
        let request = cli.structured_request();
        request.aggregation()?;
        let service = self.script_service()?;

        let output = service.generate(&request).await?;
        service.write(&cli.out, &output.commands)?;
        display::script_written(&cli.out, &output.commands, PREVIEW_LINES);

        if cli.execute {
            if service.engine_available() {
                println!("{}", "Executing via PyMOL...".cyan());
                let report = service.execute(&output.commands).await;
                display::execution_report(&report);
            } else {
                eprintln!("{}", "Skipping execution (PyMOL not available)".yellow());
                eprintln!("Open the .pml in PyMOL: File > Run...");
            }
        } else {
            println!("Run in PyMOL: {}", self.run_hint(&cli.out));
        }
        Ok(())
    }

    fn run_hint(&self, out: &Path) -> String {
        match locate_executable(&self.config.engine.executable) {
            Some(_) => format!("{} -cq {}", self.config.engine.executable, out.display()),
            None => format!("Open PyMOL > File > Run... > {}", out.display()),
        }
    }

    async fn run_request(&self, cli: &Cli) -> Result<()> {
        let request = cli.request.as_deref().unwrap_or_default().trim();
        if request.is_empty() {
            return Err(Error::InvalidArguments("--request must not be empty".to_string()));
        }

        let mut agent = self.agent_service()?;
        preload(&mut agent, cli).await?;

        let result = agent.generate(request, None).await;
        if !result.success {
            return Err(Error::Upstream(
                result.error.unwrap_or_else(|| "generation failed".to_string()),
            ));
        }
        display::generation(&result);

        if cli.execute {
            let report = agent.execute_commands(&result.command_lines(), true).await;
            display::execution_report(&report);
        }
        Ok(())
    }

    async fn run_interactive(&mut self, cli: &Cli) -> Result<()> {
        let mut agent = self.agent_service()?;
        preload(&mut agent, cli).await?;
        display::banner(agent.model(), agent.engine_available());

        while let Some(line) = self.read_input_line()? {
            match line.trim() {
                "" => continue,
                "quit" | "exit" => break,
                "help" => println!("{}", agent.help(None).await),
                "clear" => {
                    agent.clear_history();
                    println!("{}", "Conversation history cleared".green());
                }
                request => {
                    let result = agent.generate(request, None).await;
                    if !result.success {
                        display::failure(result.error.as_deref().unwrap_or("generation failed"));
                        continue;
                    }
                    display::generation(&result);

                    if agent.engine_available()
                        && !result.commands.is_empty()
                        && ask_confirmation("Execute commands?", true)?
                    {
                        let report = agent.execute_commands(&result.command_lines(), true).await;
                        display::execution_report(&report);
                    }
                }
            }
        }

        println!("{}", "Goodbye!".cyan());
        Ok(())
    }

    async fn run_web(&self) -> Result<()> {
        let completion = match self.completion() {
            Ok(completion) => Some(completion),
            Err(e) => {
                tracing::warn!(error = %e, "agent unavailable, conversational routes will fail");
                None
            }
        };
        let sessions = SessionRegistry::new(
            self.config.web.max_sessions,
            Duration::from_secs(self.config.web.session_idle_seconds),
        );
        let state = AppState::new(completion, self.executor()).with_sessions(sessions);
        AxumServer::new(state).run(&self.config.web.bind).await
    }

    /// `None` on end of input.
    fn read_input_line(&mut self) -> Result<Option<String>> {
        if let Some(queue) = &mut self.scripted_inputs {
            return Ok(queue.pop_front());
        }

        print!("{} ", "molscribe>".cyan().bold());
        std::io::stdout().flush()?;
        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end().to_string()))
    }
}

/// Registers the structures named by `--load-pdb` and `--load-file`.
async fn preload(agent: &mut AgentService, cli: &Cli) -> Result<()> {
    if let Some(id) = cli.load_pdb.as_deref() {
        let outcome = agent.load_structure(Some(id), None, None).await?;
        display::structure_loaded(&outcome.structure_name, &outcome.load_command);
    }
    if let Some(path) = cli.load_file.as_deref() {
        let outcome = agent.load_structure(None, Some(path), None).await?;
        display::structure_loaded(&outcome.structure_name, &outcome.load_command);
    }
    Ok(())
}
