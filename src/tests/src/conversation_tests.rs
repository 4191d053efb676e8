use crate::fakes::ScriptedCompletion;
use application::agent_service::AgentService;
use application::command_corrector::CommandCorrector;
use application::command_validator::CommandValidator;
use domain::entities::conversation::HISTORY_CAPACITY;
use domain::entities::{ConversationHistory, ConversationTurn, Role};
use domain::Lexicon;
use shared::error::Error;
use std::sync::Arc;

fn agent(completion: Arc<ScriptedCompletion>) -> AgentService {
    application::create_agent_service(completion, None)
}

#[tokio::test]
async fn test_conversational_keeps_invalid_lines_and_suggests() {
    let mut agent = agent(ScriptedCompletion::replying("fetch 1abc\ncartoom\ncolor red"));
    let result = agent.generate("show 1abc as cartoon in red", None).await;

    assert!(result.success);
    assert_eq!(result.command_lines(), vec!["fetch 1abc", "cartoom", "color red"]);
    assert!(result.commands[0].valid);
    assert!(!result.commands[1].valid);
    assert!(result.commands[1].message.contains("Did you mean: cartoon"));
    assert!(result.commands[2].valid);
    assert_eq!(result.model_used.as_deref(), Some("scripted"));
    assert_eq!(result.raw_response.as_deref(), Some("fetch 1abc\ncartoom\ncolor red"));
}

#[tokio::test]
async fn test_prose_and_fences_are_not_commands() {
    let raw = "Here are the PyMOL commands:\n```\nshow cartoon\n# color it\ncolor blue\n```\n\
               Note: run these in order.";
    let mut agent = agent(ScriptedCompletion::replying(raw));
    let result = agent.generate("cartoon in blue", None).await;
    assert_eq!(result.command_lines(), vec!["show cartoon", "color blue"]);
    assert_eq!(result.explanation, raw);
}

#[tokio::test]
async fn test_upstream_failure_is_a_failed_result() {
    let completion = ScriptedCompletion::failing("request timed out");
    let mut agent = agent(completion.clone());
    let result = agent.generate("show sticks", None).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("request timed out"));
    assert!(result.commands.is_empty());
    assert!(agent.history().is_empty());
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_empty_request_never_reaches_the_model() {
    let completion = ScriptedCompletion::replying("zoom");
    let mut agent = agent(completion.clone());
    let result = agent.generate("   ", None).await;
    assert!(!result.success);
    assert_eq!(completion.calls(), 0);
}

#[test]
fn test_history_evicts_exactly_the_oldest() {
    let mut history = ConversationHistory::default();
    for i in 0..HISTORY_CAPACITY {
        history.push(ConversationTurn::new(Role::User, format!("turn {}", i)));
    }
    assert_eq!(history.len(), 20);

    history.push(ConversationTurn::new(Role::User, "turn 20"));
    assert_eq!(history.len(), 20);
    let contents: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents.first(), Some(&"turn 1"));
    assert_eq!(contents.last(), Some(&"turn 20"));
}

#[tokio::test]
async fn test_agent_history_stays_bounded() {
    let completion = ScriptedCompletion::replying("zoom");
    let mut agent = agent(completion.clone());
    for i in 0..11 {
        agent.generate(&format!("request {}", i), None).await;
    }

    let history = agent.history();
    assert_eq!(history.len(), 20);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "request 1");
    // six prior turns plus the new request
    assert_eq!(completion.last_messages().len(), 7);
}

#[tokio::test]
async fn test_clear_keeps_structures() {
    let mut agent = agent(ScriptedCompletion::replying("zoom"));
    agent.load_structure(Some("1abc"), None, None).await.unwrap();
    agent.generate("zoom in", None).await;
    assert_eq!(agent.history().len(), 2);

    agent.clear_history();
    assert!(agent.history().is_empty());
    assert_eq!(agent.structures().len(), 1);
}

#[tokio::test]
async fn test_load_by_id_and_explicit_name() {
    let mut agent = agent(ScriptedCompletion::replying("zoom"));

    let first = agent.load_structure(Some("6HRE"), None, None).await.unwrap();
    assert!(first.success);
    assert_eq!(first.structure_name, "6hre");
    assert_eq!(first.load_command, "fetch 6HRE, 6hre");

    let second = agent.load_structure(Some("6HRE"), None, Some("tau")).await.unwrap();
    assert_eq!(second.structure_name, "tau");

    let names: Vec<String> = agent.structures().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["6hre", "tau"]);
    assert_eq!(agent.structure("6hre").unwrap().source_id.as_deref(), Some("6HRE"));
}

#[tokio::test]
async fn test_load_argument_errors() {
    let mut agent = agent(ScriptedCompletion::replying("zoom"));
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tau.pdb");
    std::fs::write(&file, "ATOM\n").unwrap();

    assert!(matches!(
        agent.load_structure(None, None, None).await,
        Err(Error::InvalidArguments(_))
    ));
    assert!(matches!(
        agent.load_structure(Some("1abc"), Some(&file), None).await,
        Err(Error::InvalidArguments(_))
    ));
    assert!(matches!(
        agent.load_structure(None, Some(&dir.path().join("missing.pdb")), None).await,
        Err(Error::NotFound(_))
    ));

    let loaded = agent.load_structure(None, Some(&file), None).await.unwrap();
    assert_eq!(loaded.structure_name, "tau");
    assert_eq!(loaded.load_command, format!("load {}, tau", file.display()));
}

#[tokio::test]
async fn test_loaded_structures_reach_the_prompt() {
    let completion = ScriptedCompletion::replying("show cartoon, 6hre");
    let mut agent = agent(completion.clone());
    agent.load_structure(Some("6HRE"), None, None).await.unwrap();
    agent.generate("show it as cartoon", None).await;

    let messages = completion.last_messages();
    let prompt = &messages.last().unwrap().content;
    assert!(prompt.contains("show it as cartoon"));
    assert!(prompt.contains("Currently loaded structures:"));
    assert!(prompt.contains("- 6hre: PDB structure 6HRE"));
}

#[tokio::test]
async fn test_analyze_unknown_structure() {
    let completion = ScriptedCompletion::replying("zoom");
    let mut agent = agent(completion.clone());
    let err = agent.analyze_structure("nothing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn test_analyze_sends_structure_context() {
    let completion = ScriptedCompletion::replying("show cartoon, 6hre\nspectrum b, rainbow, 6hre");
    let mut agent = agent(completion.clone());
    agent.load_structure(Some("6HRE"), None, None).await.unwrap();

    let result = agent.analyze_structure("6hre").await.unwrap();
    assert!(result.success);
    assert_eq!(result.commands.len(), 2);

    let messages = completion.last_messages();
    let prompt = &messages.last().unwrap().content;
    assert!(prompt.contains("Analyze the molecular structure '6hre'"));
    assert!(prompt.contains("\"analysis_mode\": true"));
}

#[tokio::test]
async fn test_visualization_script_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.pml");
    let completion =
        ScriptedCompletion::replying("fetch 1abc\nshow cartoon\nray 2400, 1800\npng figure.png");
    let mut agent = agent(completion);

    let outcome = agent
        .create_visualization_script("publication figure of 1abc", Some(&path))
        .await;
    assert!(outcome.generation.success);
    assert!(outcome.save_error.is_none());
    assert_eq!(outcome.script_file.as_deref(), Some(path.as_path()));

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(Some(written.as_str()), outcome.complete_script.as_deref());
    assert!(written.starts_with('#'));
    assert!(written.contains("publication figure of 1abc"));
    assert!(written.trim_end().ends_with("png figure.png"));
}

#[tokio::test]
async fn test_visualization_script_save_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("figure.pml");
    let mut agent = agent(ScriptedCompletion::replying("show cartoon"));

    let outcome = agent.create_visualization_script("cartoon", Some(&path)).await;
    assert!(outcome.generation.success);
    assert!(outcome.complete_script.is_some());
    assert!(outcome.save_error.is_some());
}

#[tokio::test]
async fn test_help() {
    let completion = ScriptedCompletion::replying("ray renders the scene with shadows.");
    let mut agent = agent(completion.clone());

    let usage = agent.help(None).await;
    assert!(usage.contains("molscribe"));
    assert_eq!(completion.calls(), 0);

    let topic = agent.help(Some("ray")).await;
    assert_eq!(topic, "ray renders the scene with shadows.");
    let messages = completion.last_messages();
    let prompt = &messages.last().unwrap().content;
    assert!(prompt.contains("PyMOL topic: ray"));
}

#[test]
fn test_typo_fix_is_idempotent() {
    let corrector = CommandCorrector::new(Arc::new(Lexicon::standard()));
    let lexicon = Lexicon::standard();
    for verb in lexicon.verbs() {
        assert_eq!(corrector.fix_typo(verb), verb);
    }
    for typo in ["cartoom", "stiks", "colr", "ceter"] {
        let once = corrector.fix_typo(typo);
        assert_ne!(once, typo);
        assert_eq!(corrector.fix_typo(once), once);
    }
}

#[test]
fn test_validator_is_total() {
    let validator = CommandValidator::new(Arc::new(Lexicon::standard()));
    let inputs = [
        "",
        " ",
        "cmd.",
        "cmd.cmd.",
        ",,,",
        "color",
        "color ,",
        "translate",
        "mview store",
        "\u{0}\u{1}",
        "🧬 show",
        "show\tcartoon",
        "x".repeat(10_000).as_str(),
    ]
    .map(str::to_string);
    for input in inputs {
        let validation = validator.validate(&input);
        assert!(!validation.message.is_empty());
    }
}
