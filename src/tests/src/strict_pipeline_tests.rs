use crate::fakes::{ScriptedCompletion, ScriptedExecutor};
use domain::rules::{STRICT_BLOCKLIST, STRICT_WHITELIST};
use infrastructure::prompt_engineer::{PromptEngineer, StructuredRequest};
use shared::error::Error;
use std::sync::Arc;

fn tau_request() -> StructuredRequest {
    StructuredRequest {
        object: "tau".into(),
        source_id: Some("6HRE".into()),
        copies: Some(10),
        step: Some(15.0),
        axis: Some("x".into()),
        extra: None,
    }
}

#[tokio::test]
async fn test_partial_aggregation_rejected_before_any_call() {
    let partials = [
        (Some(3), None, None),
        (None, Some(2.5), None),
        (None, None, Some("z")),
        (Some(3), Some(2.5), None),
        (Some(3), None, Some("z")),
        (None, Some(2.5), Some("z")),
    ];

    let completion = ScriptedCompletion::replying("fetch 1abc");
    let service = application::create_script_service(completion.clone(), None);
    for (copies, step, axis) in partials {
        let request = StructuredRequest {
            copies,
            step,
            axis: axis.map(str::to_string),
            ..StructuredRequest::new("obj")
        };
        let err = service.generate(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)), "{:?}", request);
    }
    assert_eq!(completion.calls(), 0);
}

#[test]
fn test_tau_prompt_has_nine_shifts_and_ends_with_zoom() {
    let prompt = PromptEngineer::new().structured(&tau_request()).unwrap();

    let translates: Vec<&str> = prompt
        .user_prompt
        .lines()
        .filter(|l| l.starts_with("translate"))
        .collect();
    assert_eq!(translates.len(), 9);
    for (k, line) in (2..=10).zip(&translates) {
        assert_eq!(*line, format!("translate [15.0, 0.0, 0.0], tau_{}", k));
    }
    assert_eq!(prompt.plan.last().map(String::as_str), Some("zoom all"));
    assert_eq!(prompt.plan.first().map(String::as_str), Some("fetch 6HRE, tau"));
}

#[tokio::test]
async fn test_strict_extraction_drops_unknown_verb() {
    let completion = ScriptedCompletion::replying("fetch 1abc\ncartoom\ncolor red");
    let service = application::create_script_service(completion.clone(), None);
    let output = service.generate(&StructuredRequest::new("obj")).await.unwrap();
    assert_eq!(output.commands, vec!["fetch 1abc", "color red"]);
    assert_eq!(completion.calls(), 1);
    assert!(completion.last_system_prompt().is_some());
}

#[tokio::test]
async fn test_survivors_are_whitelisted_and_never_blocked() {
    let raw = "\
Here are the commands you asked for:
```
fetch 6HRE, tau
hide everything
show cartoon, tau
python
import os
cmd.show('sticks')
run evil.py
@script.pml
delete all
remove solvent
color red, ss h
select site, resi 10-20 and not hetatm
zoom all
```
Enjoy!";
    let completion = ScriptedCompletion::replying(raw);
    let service = application::create_script_service(completion, None);
    let output = service.generate(&StructuredRequest::new("tau")).await.unwrap();

    assert_eq!(
        output.commands,
        vec![
            "fetch 6HRE, tau",
            "hide everything",
            "show cartoon, tau",
            "color red, ss h",
            "select site, resi 10-20 and not hetatm",
            "zoom all",
        ]
    );
    for line in &output.commands {
        let verb = line.split_whitespace().next().unwrap().trim_end_matches(',');
        assert!(STRICT_WHITELIST.contains(&verb), "{}", line);
        let lower = line.to_lowercase();
        assert!(!STRICT_BLOCKLIST.iter().any(|b| lower.contains(b)), "{}", line);
    }
}

#[tokio::test]
async fn test_empty_output_carries_raw_text() {
    let raw = "I'm sorry, I can only describe what to do.\nFirst, open PyMOL.";
    let service = application::create_script_service(ScriptedCompletion::replying(raw), None);
    match service.generate(&StructuredRequest::new("obj")).await {
        Err(err @ Error::EmptyOutput { .. }) => {
            assert_eq!(err.kind().exit_code(), 2);
            let Error::EmptyOutput { raw: carried } = err else { unreachable!() };
            assert_eq!(carried, raw);
        }
        other => panic!("expected EmptyOutput, got {:?}", other.map(|o| o.commands)),
    }
}

#[tokio::test]
async fn test_upstream_failure_propagates() {
    let service = application::create_script_service(
        ScriptedCompletion::failing("HTTP 401 Unauthorized"),
        None,
    );
    let err = service.generate(&StructuredRequest::new("obj")).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
    assert_eq!(err.kind().exit_code(), 1);
}

#[tokio::test]
async fn test_written_script_round_trips_commands() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pml");
    let service = application::create_script_service(
        ScriptedCompletion::replying("fetch 1abc   \nshow cartoon\nzoom all"),
        None,
    );
    let output = service.generate(&StructuredRequest::new("obj")).await.unwrap();
    service.write(&path, &output.commands).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "fetch 1abc\nshow cartoon\nzoom all\n"
    );
}

#[tokio::test]
async fn test_strict_execution_does_not_correct() {
    let engine = Arc::new(ScriptedExecutor::new().reject("show", "requires a representation type"));
    let service = application::create_script_service(
        ScriptedCompletion::replying("show\nzoom all"),
        Some(engine.clone()),
    );
    let output = service.generate(&StructuredRequest::new("obj")).await.unwrap();
    let report = service.execute(&output.commands).await;
    assert!(!report.success);
    assert_eq!(report.commands_executed, 1);
    assert!(report.corrected_commands.is_empty());
    assert_eq!(engine.seen(), vec!["show", "zoom all"]);
}

#[tokio::test]
async fn test_strict_execution_without_engine() {
    let service =
        application::create_script_service(ScriptedCompletion::replying("zoom all"), None);
    assert!(!service.engine_available());
    let report = service.execute(&["zoom all".to_string()]).await;
    assert!(!report.success);
    assert_eq!(report.total_commands, 1);
    assert!(report.error.unwrap().starts_with("PyMOL not available"));
}
