use crate::fakes::{ScriptedCompletion, ScriptedExecutor};
use application::agent_service::AgentService;
use domain::entities::ExecutionStatus;
use shared::error::Error;
use std::sync::Arc;

fn agent_with(engine: &Arc<ScriptedExecutor>) -> AgentService {
    application::create_agent_service(ScriptedCompletion::replying("zoom"), Some(engine.clone()))
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_missing_argument_corrected_once() {
    let engine = Arc::new(
        ScriptedExecutor::new().reject("show", "'show' command requires a representation type"),
    );
    let agent = agent_with(&engine);
    let report = agent.execute_commands(&lines(&["show"]), true).await;

    assert!(report.success);
    assert_eq!(report.corrected_commands, vec!["show cartoon"]);
    assert_eq!(report.corrections_applied, 1);
    assert_eq!(report.commands_executed, 1);

    let record = &report.results[0];
    assert_eq!(record.status, ExecutionStatus::CorrectedSuccess);
    assert_eq!(record.command, "show cartoon");
    assert_eq!(record.original_command.as_deref(), Some("show"));
    assert!(record.correction_applied);
    assert_eq!(
        report.errors,
        vec!["Error executing command 'show': 'show' command requires a representation type"]
    );
    assert_eq!(engine.seen(), vec!["show", "show cartoon"]);
}

#[tokio::test]
async fn test_unknown_command_uses_nearest_verb() {
    let engine =
        Arc::new(ScriptedExecutor::new().reject("shwo sticks", "Error: unknown command 'shwo'"));
    let agent = agent_with(&engine);
    let report = agent.execute_commands(&lines(&["fetch 1abc", "shwo sticks"]), true).await;

    assert!(report.success);
    assert_eq!(report.results[1].command, "show sticks");
    assert_eq!(report.results[1].index, 1);
}

#[tokio::test]
async fn test_uncorrectable_failure_is_recorded() {
    let engine = Arc::new(
        ScriptedExecutor::new().reject("zoom nothing", "Selector-Error: invalid selection"),
    );
    let agent = agent_with(&engine);
    let report = agent
        .execute_commands(&lines(&["zoom nothing", "orient"]), true)
        .await;

    assert!(!report.success);
    assert_eq!(report.commands_executed, 1);
    assert_eq!(report.total_commands, 2);
    let failed = &report.results[0];
    assert_eq!(failed.status, ExecutionStatus::Error);
    assert_eq!(failed.error.as_deref(), Some("Selector-Error: invalid selection"));
    assert_eq!(failed.attempted_correction, None);
    assert_eq!(engine.seen(), vec!["zoom nothing", "orient"]);
}

#[tokio::test]
async fn test_invalid_color_replaced() {
    let engine = Arc::new(
        ScriptedExecutor::new().reject("color blurple, chain A", "Invalid color 'blurple'"),
    );
    let agent = agent_with(&engine);
    let report = agent.execute_commands(&lines(&["color blurple, chain A"]), true).await;
    assert!(report.success);
    assert_eq!(report.corrected_commands, vec!["color red, chain A"]);
}

#[tokio::test]
async fn test_engine_crash_aborts_with_partial_results() {
    let engine = Arc::new(ScriptedExecutor::new().crash_on("ray 2400, 1800"));
    let agent = agent_with(&engine);
    let report = agent
        .execute_commands(&lines(&["fetch 1abc", "ray 2400, 1800", "png out.png"]), true)
        .await;

    assert!(!report.success);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].command, "fetch 1abc");
    assert!(report.error.unwrap().starts_with("Critical execution error"));
    assert_eq!(engine.seen(), vec!["fetch 1abc", "ray 2400, 1800"]);
}

#[tokio::test]
async fn test_load_runs_through_engine() {
    let engine = Arc::new(ScriptedExecutor::new());
    let mut agent = agent_with(&engine);
    assert!(agent.engine_available());

    agent.load_structure(Some("6HRE"), None, Some("tau")).await.unwrap();
    assert_eq!(engine.seen(), vec!["fetch 6HRE, tau"]);
}

#[tokio::test]
async fn test_rejected_load_is_not_registered() {
    let engine =
        Arc::new(ScriptedExecutor::new().reject("fetch 0000, 0000", "Error: unable to fetch"));
    let mut agent = agent_with(&engine);

    let err = agent.load_structure(Some("0000"), None, None).await.unwrap_err();
    assert!(matches!(err, Error::Execution(_)));
    assert!(agent.structures().is_empty());
}
