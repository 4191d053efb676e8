//! Terminal output for the CLI modes

use colored::Colorize;
use domain::entities::{ExecutionReport, ExecutionStatus, GenerationResult};
use shared::error::Error;
use std::path::Path;

pub fn banner(model: &str, engine_available: bool) {
    println!("{}", "molscribe interactive".bold().cyan());
    println!("Model: {}", model);
    if engine_available {
        println!("PyMOL: {}", "available".green());
    } else {
        println!("PyMOL: {}", "not found, commands will not be executed".yellow());
    }
    println!("Type 'help' for usage, 'clear' to reset the conversation, 'quit' to leave.");
    println!();
}

/// Errors go to stderr. Empty strict output also dumps the raw model text.
pub fn error(err: &Error) {
    match err {
        Error::EmptyOutput { raw } => {
            eprintln!("{}", "No valid PyMOL commands produced. Raw output:".red());
            eprintln!("{}", raw);
        }
        other => eprintln!("{} {}", "ERROR:".red().bold(), other),
    }
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

pub fn structure_loaded(name: &str, load_command: &str) {
    println!("{} {} ({})", "Loaded".green(), name.bold(), load_command.dimmed());
}

pub fn script_written(path: &Path, commands: &[String], preview: usize) {
    println!(
        "{}",
        format!("Wrote {} with {} commands.", path.display(), commands.len()).green()
    );
    println!("Preview:");
    for line in commands.iter().take(preview) {
        println!("   {}", line);
    }
}

pub fn generation(result: &GenerationResult) {
    println!("{}", result.explanation.trim());
    if result.commands.is_empty() {
        println!("{}", "No commands extracted.".yellow());
        return;
    }

    println!();
    println!("{}", "Commands:".bold());
    for command in &result.commands {
        if command.valid {
            println!("  {}", command.command.green());
        } else {
            println!(
                "  {}  {}",
                command.command.yellow(),
                format!("({})", command.message).dimmed()
            );
        }
    }
}

pub fn execution_report(report: &ExecutionReport) {
    if let Some(error) = &report.error {
        eprintln!("{}", error.red());
    }
    for record in &report.results {
        match record.status {
            ExecutionStatus::Success => println!("[OK] {}", record.command),
            ExecutionStatus::CorrectedSuccess => println!(
                "[FIXED] {} {}",
                record.command.green(),
                format!("(was: {})", record.original_command.as_deref().unwrap_or("?")).dimmed()
            ),
            ExecutionStatus::Error => println!(
                "[FAIL] {} {}",
                record.command.red(),
                record.error.as_deref().unwrap_or_default()
            ),
        }
    }

    let summary = format!(
        "Executed {}/{} commands, {} corrected",
        report.commands_executed, report.total_commands, report.corrections_applied
    );
    if report.success {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
}
