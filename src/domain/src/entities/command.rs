use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Outcome of a structural check. Advisory only: it never removes a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: "Valid command".to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// One extracted instruction line plus its validation annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCommand {
    pub command: String,
    pub valid: bool,
    pub message: String,
}

impl GeneratedCommand {
    pub fn new(command: impl Into<String>, validation: Validation) -> Self {
        Self {
            command: command.into(),
            valid: validation.valid,
            message: validation.message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub commands: Vec<GeneratedCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn succeeded(raw: String, commands: Vec<GeneratedCommand>, model: &str) -> Self {
        Self {
            success: true,
            explanation: raw.clone(),
            commands,
            raw_response: Some(raw),
            timestamp: Utc::now().to_rfc3339(),
            model_used: Some(model.to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            explanation: String::new(),
            commands: Vec::new(),
            raw_response: None,
            timestamp: Utc::now().to_rfc3339(),
            model_used: None,
            error: Some(error.into()),
        }
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.command.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    CorrectedSuccess,
    Error,
}

impl ExecutionStatus {
    pub fn executed(&self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::CorrectedSuccess)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub command: String,
    pub status: ExecutionStatus,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted_correction: Option<String>,
    pub correction_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    pub fn success(command: &str, index: usize, validation: &Validation) -> Self {
        Self {
            command: command.to_string(),
            status: ExecutionStatus::Success,
            index,
            original_command: None,
            attempted_correction: None,
            correction_applied: false,
            validation: Some(if validation.valid {
                "Valid".to_string()
            } else {
                validation.message.clone()
            }),
            error: None,
        }
    }

    pub fn corrected(corrected: &str, original: &str, index: usize) -> Self {
        Self {
            command: corrected.to_string(),
            status: ExecutionStatus::CorrectedSuccess,
            index,
            original_command: Some(original.to_string()),
            attempted_correction: None,
            correction_applied: true,
            validation: None,
            error: None,
        }
    }

    pub fn failed(command: &str, index: usize, error: &str, attempted: Option<String>) -> Self {
        Self {
            command: command.to_string(),
            status: ExecutionStatus::Error,
            index,
            original_command: None,
            attempted_correction: attempted,
            correction_applied: false,
            validation: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub success: bool,
    pub results: Vec<ExecutionRecord>,
    pub errors: Vec<String>,
    pub corrected_commands: Vec<String>,
    pub commands_executed: usize,
    pub total_commands: usize,
    pub corrections_applied: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionReport {
    /// Report for a run without an engine. Nothing is attempted.
    pub fn unavailable(total_commands: usize) -> Self {
        Self {
            success: false,
            total_commands,
            error: Some("PyMOL not available. Commands generated but not executed.".to_string()),
            ..Self::default()
        }
    }

    /// Close a run. `success` holds iff no failure survived correction.
    pub fn complete(
        results: Vec<ExecutionRecord>,
        errors: Vec<String>,
        corrected_commands: Vec<String>,
        total_commands: usize,
    ) -> Self {
        let commands_executed = results.iter().filter(|r| r.status.executed()).count();
        let failures = results
            .iter()
            .filter(|r| r.status == ExecutionStatus::Error)
            .count();
        Self {
            success: failures == 0,
            corrections_applied: corrected_commands.len(),
            results,
            errors,
            corrected_commands,
            commands_executed,
            total_commands,
            error: None,
        }
    }

    /// Report for a run aborted by an unexpected fault, keeping partial progress.
    pub fn critical(
        message: &str,
        results: Vec<ExecutionRecord>,
        errors: Vec<String>,
        corrected_commands: Vec<String>,
        total_commands: usize,
    ) -> Self {
        let mut report = Self::complete(results, errors, corrected_commands, total_commands);
        report.success = false;
        report.error = Some(format!("Critical execution error: {}", message));
        report
    }
}
