use domain::entities::{ExecutionRecord, ExecutionReport};
use domain::services::CommandExecutor;
use shared::error::Error;
use std::sync::Arc;

use crate::command_corrector::CommandCorrector;
use crate::command_validator::CommandValidator;

/// Sends command lines to the engine in order, with at most one correction per failure.
#[derive(Clone)]
pub struct CommandRunner {
    executor: Option<Arc<dyn CommandExecutor>>,
    validator: CommandValidator,
    corrector: CommandCorrector,
}

enum Attempt {
    Done,
    Rejected(String),
    Fatal(Error),
}

impl CommandRunner {
    pub fn new(
        executor: Option<Arc<dyn CommandExecutor>>,
        validator: CommandValidator,
        corrector: CommandCorrector,
    ) -> Self {
        Self {
            executor,
            validator,
            corrector,
        }
    }

    pub fn has_engine(&self) -> bool {
        self.executor.is_some()
    }

    async fn attempt(executor: &dyn CommandExecutor, command: &str) -> Attempt {
        match executor.execute(command).await {
            Ok(()) => Attempt::Done,
            Err(Error::Execution(message)) => Attempt::Rejected(message),
            Err(other) => Attempt::Fatal(other),
        }
    }

    /// Blank and `#` comment lines are skipped but still count toward `total_commands`.
    /// An engine fault other than a rejected command aborts the run with partial results.
    pub async fn run(&self, commands: &[String], retry_on_error: bool) -> ExecutionReport {
        let Some(executor) = self.executor.as_deref() else {
            return ExecutionReport::unavailable(commands.len());
        };

        let mut results = Vec::new();
        let mut errors = Vec::new();
        let mut corrected_commands = Vec::new();

        for (index, raw) in commands.iter().enumerate() {
            let command = raw.trim();
            if command.is_empty() || command.starts_with('#') {
                continue;
            }

            let validation = self.validator.validate(command);
            if !validation.valid {
                tracing::warn!(
                    command,
                    message = %validation.message,
                    "pre-execution validation failed"
                );
            }

            let message = match Self::attempt(executor, command).await {
                Attempt::Done => {
                    results.push(ExecutionRecord::success(command, index, &validation));
                    continue;
                }
                Attempt::Rejected(message) => message,
                Attempt::Fatal(err) => {
                    tracing::error!(command, error = %err, "critical error during execution");
                    return ExecutionReport::critical(
                        &fatal_message(&err),
                        results,
                        errors,
                        corrected_commands,
                        commands.len(),
                    );
                }
            };

            let error_text = format!("Error executing command '{}': {}", command, message);
            tracing::warn!("{}", error_text);
            errors.push(error_text);

            let mut attempted = None;
            if retry_on_error {
                attempted = self.corrector.correct(command, &message);
                if let Some(corrected) = attempted.as_deref().filter(|c| *c != command) {
                    tracing::info!(original = command, corrected, "attempting correction");
                    match Self::attempt(executor, corrected).await {
                        Attempt::Done => {
                            results.push(ExecutionRecord::corrected(corrected, command, index));
                            corrected_commands.push(corrected.to_string());
                            continue;
                        }
                        Attempt::Rejected(again) => {
                            tracing::warn!(corrected, error = %again, "correction also failed");
                        }
                        Attempt::Fatal(err) => {
                            tracing::error!(
                                command = corrected,
                                error = %err,
                                "critical error during correction"
                            );
                            return ExecutionReport::critical(
                                &fatal_message(&err),
                                results,
                                errors,
                                corrected_commands,
                                commands.len(),
                            );
                        }
                    }
                }
            }

            results.push(ExecutionRecord::failed(command, index, &message, attempted));
        }

        ExecutionReport::complete(results, errors, corrected_commands, commands.len())
    }
}

fn fatal_message(err: &Error) -> String {
    match err {
        Error::Critical(message) => message.clone(),
        other => other.to_string(),
    }
}
