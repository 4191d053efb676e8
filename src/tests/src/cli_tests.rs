use crate::fakes::{ScriptedCompletion, ScriptedExecutor};
use clap::Parser;
use infrastructure::config::Config;
use presentation::cli::{Cli, CliApp};
use std::sync::Arc;

fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("molscribe").chain(args.iter().copied()))
}

fn no_env() -> Config {
    Config::from_lookup(|_| None)
}

#[tokio::test]
async fn test_tau_stack_script_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tau_stack.pml");
    let reply = "fetch 6HRE, tau\nhide everything\nshow cartoon\ncreate tau_2, tau\n\
                 translate [15.0, 0.0, 0.0], tau_2\nzoom all";
    let completion = ScriptedCompletion::replying(reply);
    let mut app = CliApp::with_services(no_env(), completion.clone(), None);

    let code = app
        .run(cli(&[
            "--pdb", "6HRE", "--obj", "tau", "--copies", "2", "--step", "15", "--axis", "x",
            "--out", out.to_str().unwrap(),
        ]))
        .await;

    assert_eq!(code, 0);
    assert_eq!(completion.calls(), 1);
    let prompt = &completion.last_messages()[0].content;
    assert!(prompt.contains("translate [15.0, 0.0, 0.0], tau_2"));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), format!("{}\n", reply));
}

#[tokio::test]
async fn test_empty_strict_output_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.pml");
    let completion = ScriptedCompletion::replying("No idea, sorry.");
    let mut app = CliApp::with_services(no_env(), completion, None);
    let code = app.run(cli(&["--out", out.to_str().unwrap()])).await;
    assert_eq!(code, 2);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_upstream_failure_exits_one() {
    let mut app =
        CliApp::with_services(no_env(), ScriptedCompletion::failing("HTTP 500"), None);
    let code = app.run(cli(&["--request", "show cartoon"])).await;
    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_request_with_execute() {
    let engine = Arc::new(ScriptedExecutor::new());
    let mut app = CliApp::with_services(
        no_env(),
        ScriptedCompletion::replying("show cartoon\nzoom all"),
        Some(engine.clone()),
    );
    let code = app
        .run(cli(&["--load-pdb", "1abc", "--request", "cartoon please", "--execute"]))
        .await;
    assert_eq!(code, 0);
    assert_eq!(engine.seen(), vec!["fetch 1abc, 1abc", "show cartoon", "zoom all"]);
}

#[tokio::test]
async fn test_strict_execute_uses_engine() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("run.pml");
    let engine = Arc::new(ScriptedExecutor::new());
    let mut app = CliApp::with_services(
        no_env(),
        ScriptedCompletion::replying("fetch 1abc\nimport os\nzoom all"),
        Some(engine.clone()),
    );
    let code = app
        .run(cli(&["--pdb", "1abc", "--execute", "--out", out.to_str().unwrap()]))
        .await;
    assert_eq!(code, 0);
    assert_eq!(engine.seen(), vec!["fetch 1abc", "zoom all"]);
}
