//! Two-phase command-line run
//!
//! Phase one captures the page into the snapshot file, phase two repairs
//! and runs the script.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::agent::{RepairAgent, RepairOutcome};
use crate::core::{Config, HealerError, Result};
use crate::llm::LLMProvider;
use crate::tools::Snapshotter;

/// Validate a target URL typed by the user
pub fn parse_target_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(HealerError::config("URL is required"));
    }

    let url = Url::parse(input)
        .map_err(|e| HealerError::config(format!("Invalid URL '{}': {}", input, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HealerError::config(format!(
            "Unsupported URL scheme '{}', expected http or https",
            other
        ))),
    }
}

/// Ask for the target URL on stdin
pub fn prompt_for_url() -> Result<Url> {
    print!("Enter website URL: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    parse_target_url(&input)
}

/// Human-readable report of a repair outcome
pub fn describe_outcome(outcome: &RepairOutcome) -> Vec<String> {
    let mut lines = Vec::new();

    match outcome {
        RepairOutcome::Repaired {
            attempts,
            fix_log,
            execution,
        } => {
            lines.push(format!("Script repaired after {} attempt(s).", attempts));
            if fix_log.is_empty() {
                lines.push("No FIX comments found in the repaired script.".to_string());
            } else {
                lines.push("Fixes applied:".to_string());
                lines.extend(fix_log.iter().map(|fix| format!("  - {}", fix)));
            }
            match execution {
                Ok(output) => {
                    lines.push("Execution output:".to_string());
                    lines.push(output.to_string());
                }
                Err(e) => lines.push(format!("Execution failed: {}", e)),
            }
        }
        RepairOutcome::GaveUp {
            attempts,
            last_response,
        } => {
            lines.push(format!(
                "Giving up after {} attempts without a valid script.",
                attempts
            ));
            lines.push("Last model response:".to_string());
            if last_response.is_empty() {
                lines.push("(empty)".to_string());
            } else {
                lines.push(last_response.clone());
            }
        }
    }

    lines
}

/// Runs the snapshot and repair phases for one URL
pub struct Driver {
    config: Config,
    llm: Arc<dyn LLMProvider>,
}

impl Driver {
    pub fn new(config: Config, llm: Arc<dyn LLMProvider>) -> Self {
        Self { config, llm }
    }

    /// Snapshot `url`, repair the script, run it and print the report
    pub async fn run(&self, url: &Url) -> Result<RepairOutcome> {
        let started = Instant::now();
        let ui_dump = &self.config.paths.ui_dump;

        println!("\n[1/2] Capturing UI elements from {}", url);
        let count = Snapshotter::new(self.config.browser.clone())
            .dump(url.as_str(), ui_dump)
            .await?;
        println!("  Saved {} elements to {}", count, ui_dump.display());

        println!(
            "\n[2/2] Repairing {} with {} ({})",
            self.config.paths.script.display(),
            self.llm.name(),
            self.llm.model()
        );
        let agent = RepairAgent::from_config(&self.config, Arc::clone(&self.llm))
            .with_progress(Arc::new(|line: &str| println!("{}", line)));
        let outcome = agent.repair(url.as_str()).await?;

        println!();
        for line in describe_outcome(&outcome) {
            println!("{}", line);
        }
        println!(
            "\nTotal execution time: {:.2}s",
            started.elapsed().as_secs_f64()
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ExecutionOutput;

    #[test]
    fn test_parse_target_url() {
        let url = parse_target_url("  https://example.com/login \n").unwrap();
        assert_eq!(url.as_str(), "https://example.com/login");
        assert!(parse_target_url("http://localhost:8000").is_ok());
    }

    #[test]
    fn test_parse_target_url_rejects() {
        assert!(matches!(parse_target_url("   "), Err(HealerError::Config(_))));
        assert!(matches!(parse_target_url("not a url"), Err(HealerError::Config(_))));
        assert!(matches!(
            parse_target_url("file:///etc/passwd"),
            Err(HealerError::Config(_))
        ));
    }

    #[test]
    fn test_describe_repaired() {
        let outcome = RepairOutcome::Repaired {
            attempts: 2,
            fix_log: vec!["FIX: use 'user_email'".to_string()],
            execution: Ok(ExecutionOutput {
                stdout: "ok\n".into(),
                stderr: String::new(),
                exit_code: Some(0),
            }),
        };
        let lines = describe_outcome(&outcome);
        assert_eq!(lines[0], "Script repaired after 2 attempt(s).");
        assert!(lines.contains(&"  - FIX: use 'user_email'".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("STDOUT:\nok")));
    }

    #[test]
    fn test_describe_gave_up_with_empty_response() {
        let outcome = RepairOutcome::GaveUp {
            attempts: 3,
            last_response: String::new(),
        };
        let lines = describe_outcome(&outcome);
        assert!(lines[0].contains("3 attempts"));
        assert_eq!(lines.last().map(String::as_str), Some("(empty)"));
    }

    #[test]
    fn test_describe_execution_timeout() {
        let outcome = RepairOutcome::Repaired {
            attempts: 1,
            fix_log: vec![],
            execution: Err(HealerError::ExecutionTimeout { secs: 60 }),
        };
        let lines = describe_outcome(&outcome);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Execution failed: Script execution timed out after 60s")
        );
    }
}
