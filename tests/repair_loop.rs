//! Repair loop integration tests
//!
//! Drives the loop with a scripted model and temp files.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use selenium_healer::core::{ElementRecord, HealerError, Message, Result};
use selenium_healer::llm::{GenerateOptions, LLMProvider, LLMResponse};
use selenium_healer::tools::browser::write_snapshot;
use selenium_healer::tools::{PythonSyntax, Sandbox, ScriptStore, SyntaxValidator};
use selenium_healer::{RepairAgent, RepairOutcome};

const ORIGINAL_SCRIPT: &str = "driver.find_element(By.ID, 'username-input')\n";

/// Model double replaying canned replies, then empty ones
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[Message],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))?;
        Ok(LLMResponse {
            content: reply,
            usage: None,
            model: "scripted".to_string(),
        })
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

/// Accepts code whose parentheses balance
struct ParenValidator;

#[async_trait]
impl SyntaxValidator for ParenValidator {
    async fn validate(&self, code: &str) -> Result<()> {
        let open = code.matches('(').count();
        let close = code.matches(')').count();
        if open == close {
            Ok(())
        } else {
            Err(HealerError::InvalidSyntax("unbalanced parentheses".into()))
        }
    }
}

async fn write_fixtures(dir: &Path) {
    let mut input = ElementRecord::new("input");
    input.attributes.insert("id".into(), "user_email".into());
    input.visible = true;
    input.enabled = true;
    write_snapshot(&dir.join("ui_dump.json"), &[input])
        .await
        .unwrap();
    tokio::fs::write(dir.join("script.py"), ORIGINAL_SCRIPT)
        .await
        .unwrap();
}

fn stub_agent(dir: &Path, llm: Arc<ScriptedProvider>, max_attempts: usize) -> RepairAgent {
    let store = ScriptStore::with_validator(dir.join("script.py"), Arc::new(ParenValidator));
    let sandbox = Sandbox::new(
        store.clone(),
        "definitely-not-a-python-binary",
        Duration::from_secs(5),
    );
    RepairAgent::new(llm, store, sandbox, dir.join("ui_dump.json"), max_attempts)
}

#[tokio::test]
async fn test_empty_replies_give_up_and_leave_script() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path()).await;

    let llm = ScriptedProvider::new(vec![Ok(String::new()), Ok(String::new()), Ok(String::new())]);
    let agent = stub_agent(dir.path(), llm.clone(), 3);

    let outcome = agent.repair("https://example.com/login").await.unwrap();
    match outcome {
        RepairOutcome::GaveUp {
            attempts,
            last_response,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_response, "");
        }
        other => panic!("expected GaveUp, got {:?}", other),
    }

    assert_eq!(llm.calls(), 3);
    let script = tokio::fs::read_to_string(dir.path().join("script.py"))
        .await
        .unwrap();
    assert_eq!(script, ORIGINAL_SCRIPT);
}

#[tokio::test]
async fn test_attempts_never_exceed_bound() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path()).await;

    let broken = || Ok("```python\nprint((\n```".to_string());
    let llm = ScriptedProvider::new(vec![broken(), broken(), broken(), broken(), broken()]);
    let agent = stub_agent(dir.path(), llm.clone(), 3);

    let outcome = agent.repair("https://example.com").await.unwrap();
    assert!(!outcome.is_repaired());
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(llm.calls(), 3);

    if let RepairOutcome::GaveUp { last_response, .. } = outcome {
        assert_eq!(last_response, "```python\nprint((\n```");
    }
}

#[tokio::test]
async fn test_invalid_then_valid_candidate() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path()).await;

    let llm = ScriptedProvider::new(vec![
        Ok("```python\ndriver.find_element((By.ID, 'user_email')\n```".to_string()),
        Ok("I fixed it:\n# FIX: use 'user_email'\ndriver.find_element(By.ID, 'user_email')\n"
            .to_string()),
    ]);
    let agent = stub_agent(dir.path(), llm.clone(), 3);

    let outcome = agent.repair("https://example.com/login").await.unwrap();
    match outcome {
        RepairOutcome::Repaired {
            attempts,
            fix_log,
            execution,
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(fix_log, vec!["FIX: use 'user_email'".to_string()]);
            // The run fails to launch; that is reported, not retried
            assert!(matches!(execution, Err(HealerError::LaunchFailure(_))));
        }
        other => panic!("expected Repaired, got {:?}", other),
    }

    assert_eq!(llm.calls(), 2);
    let script = tokio::fs::read_to_string(dir.path().join("script.py"))
        .await
        .unwrap();
    assert_eq!(
        script,
        "# FIX: use 'user_email'\ndriver.find_element(By.ID, 'user_email')"
    );
}

#[tokio::test]
async fn test_missing_snapshot_fails_before_model_call() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("script.py"), ORIGINAL_SCRIPT)
        .await
        .unwrap();

    let llm = ScriptedProvider::new(vec![]);
    let agent = stub_agent(dir.path(), llm.clone(), 3);

    let err = agent.repair("https://example.com").await.unwrap_err();
    assert!(matches!(err, HealerError::MissingFile { ref path } if path.ends_with("ui_dump.json")));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_missing_script_fails_before_model_call() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path()).await;
    tokio::fs::remove_file(dir.path().join("script.py"))
        .await
        .unwrap();

    let llm = ScriptedProvider::new(vec![]);
    let agent = stub_agent(dir.path(), llm.clone(), 3);

    let err = agent.repair("https://example.com").await.unwrap_err();
    assert!(matches!(err, HealerError::MissingFile { ref path } if path.ends_with("script.py")));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_provider_error_aborts_loop() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path()).await;

    let llm = ScriptedProvider::new(vec![Err(HealerError::provider("HTTP 500"))]);
    let agent = stub_agent(dir.path(), llm.clone(), 3);

    let err = agent.repair("https://example.com").await.unwrap_err();
    assert!(matches!(err, HealerError::Provider(_)));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_repair_persists_and_runs_script() {
    let python = PythonSyntax::default();
    if !python.is_available().await {
        eprintln!("Skipping test: {} not found", python.interpreter());
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path()).await;

    let interpreter = python.interpreter().to_string();
    let store = ScriptStore::new(dir.path().join("script.py"), &interpreter);
    let sandbox = Sandbox::new(store.clone(), &interpreter, Duration::from_secs(30));
    let llm = ScriptedProvider::new(vec![Ok("```python\nprint('ok')\n```".to_string())]);
    let agent = RepairAgent::new(llm.clone(), store, sandbox, dir.path().join("ui_dump.json"), 3);

    let outcome = agent.repair("https://example.com").await.unwrap();
    match outcome {
        RepairOutcome::Repaired {
            attempts,
            fix_log,
            execution,
        } => {
            assert_eq!(attempts, 1);
            assert!(fix_log.is_empty());
            let output = execution.unwrap();
            assert!(output.stdout.contains("ok"));
            assert!(output.succeeded());
        }
        other => panic!("expected Repaired, got {:?}", other),
    }

    let script = tokio::fs::read_to_string(dir.path().join("script.py"))
        .await
        .unwrap();
    assert_eq!(script, "print('ok')");
}
