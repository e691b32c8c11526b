//! Interactive shell
//!
//! Console front end with one background task per action. While an action
//! runs, new actions are refused; results land in a timestamped status log.

use std::future::Future;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::RepairAgent;
use crate::cli::commands::{help_text, parse_command, ShellCommand};
use crate::cli::driver::{describe_outcome, parse_target_url};
use crate::core::{Config, Result};
use crate::llm::LLMProvider;
use crate::tools::browser::{format_for_display, read_snapshot};
use crate::tools::{Sandbox, ScriptStore, Snapshotter};

/// Timestamped status lines, shared with background tasks
#[derive(Clone, Default)]
pub struct StatusLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and echo it
    pub fn push(&self, message: impl AsRef<str>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        let line = format!("[{}] {}", stamp, message.as_ref());
        println!("{}", line);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Clears the busy flag when the action ends
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Interactive shell over one configuration and model client
pub struct Shell {
    config: Arc<Config>,
    llm: Arc<dyn LLMProvider>,
    url: Option<String>,
    busy: Arc<AtomicBool>,
    log: StatusLog,
}

impl Shell {
    /// Create a shell, optionally with a preset URL
    pub fn new(config: Config, llm: Arc<dyn LLMProvider>, url: Option<String>) -> Self {
        Self {
            config: Arc::new(config),
            llm,
            url,
            busy: Arc::new(AtomicBool::new(false)),
            log: StatusLog::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run the shell until `exit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("healer> ");
            io::stdout().flush()?;

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => {
                    println!();
                    break;
                }
            };

            if !self.handle(parse_command(&line)).await {
                break;
            }
        }

        if self.is_busy() {
            println!("An action is still running and will be stopped.");
        }
        println!("Goodbye!");
        Ok(())
    }

    /// Handle one command; `false` means leave the shell
    pub async fn handle(&mut self, command: ShellCommand) -> bool {
        if command.is_action() && self.is_busy() {
            println!("Another action is still running. Check 'status' or 'log'.");
            return true;
        }

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Exit => return false,
            ShellCommand::Help => println!("{}\n", help_text()),
            ShellCommand::ShowUrl => match self.url {
                Some(ref url) => println!("URL: {}", url),
                None => println!("No URL set. Use: url <address>"),
            },
            ShellCommand::SetUrl(input) => match parse_target_url(&input) {
                Ok(url) => {
                    self.log.push(format!("URL set to {}", url));
                    self.url = Some(url.to_string());
                }
                Err(e) => println!("{}", e),
            },
            ShellCommand::Dump => self.start_dump(),
            ShellCommand::Agent => self.start_agent(),
            ShellCommand::Run => self.start_run(),
            ShellCommand::ShowUi => match read_snapshot(&self.config.paths.ui_dump).await {
                Ok(records) => println!("{}", format_for_display(&records)),
                Err(e) => println!("{}", e),
            },
            ShellCommand::ShowScript => match self.script_store().read().await {
                Ok(code) => println!("{}", code),
                Err(e) => println!("{}", e),
            },
            ShellCommand::Log => {
                let entries = self.log.entries();
                if entries.is_empty() {
                    println!("Status log is empty.");
                }
                for entry in entries {
                    println!("{}", entry);
                }
            }
            ShellCommand::Status => println!("{}", self.status_text()),
            ShellCommand::ShowConfig => println!("{}", self.config.to_toml()),
            ShellCommand::SaveConfig => match self.config.save() {
                Ok(path) => self.log.push(format!("Configuration saved to {}", path.display())),
                Err(e) => println!("{}", e),
            },
            ShellCommand::Unknown(input) => println!(
                "Unknown command: {}. Type 'help' for available commands.",
                input
            ),
        }
        true
    }

    fn script_store(&self) -> ScriptStore {
        ScriptStore::new(&self.config.paths.script, &self.config.repair.python)
    }

    fn require_url(&self) -> Option<String> {
        if self.url.is_none() {
            println!("No URL set. Use: url <address>");
        }
        self.url.clone()
    }

    /// Spawn `action` unless another one is running
    fn spawn_action<F>(&self, name: &'static str, action: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let Some(guard) = BusyGuard::acquire(&self.busy) else {
            println!("Another action is still running. Check 'status' or 'log'.");
            return;
        };

        let log = self.log.clone();
        log.push(format!("{} started", name));

        tokio::spawn(async move {
            let _guard = guard;
            match tokio::spawn(action).await {
                Ok(Ok(())) => log.push(format!("{} finished", name)),
                Ok(Err(e)) => log.push(format!("{} failed: {}", name, e)),
                Err(e) => log.push(format!("{} crashed: {}", name, e)),
            }
        });
    }

    fn start_dump(&self) {
        let Some(url) = self.require_url() else {
            return;
        };
        let config = Arc::clone(&self.config);
        let log = self.log.clone();

        self.spawn_action("Dump", async move {
            let count = Snapshotter::new(config.browser.clone())
                .dump(&url, &config.paths.ui_dump)
                .await?;
            log.push(format!(
                "Saved {} elements to {}",
                count,
                config.paths.ui_dump.display()
            ));
            Ok(())
        });
    }

    fn start_agent(&self) {
        let Some(url) = self.require_url() else {
            return;
        };
        let config = Arc::clone(&self.config);
        let llm = Arc::clone(&self.llm);
        let log = self.log.clone();

        self.spawn_action("Agent", async move {
            let count = Snapshotter::new(config.browser.clone())
                .dump(&url, &config.paths.ui_dump)
                .await?;
            log.push(format!("Captured {} elements", count));

            let progress = log.clone();
            let agent = RepairAgent::from_config(&config, llm)
                .with_progress(Arc::new(move |line: &str| progress.push(line.trim())));
            let outcome = agent.repair(&url).await?;
            for line in describe_outcome(&outcome) {
                log.push(line);
            }
            Ok(())
        });
    }

    fn start_run(&self) {
        let store = self.script_store();
        let sandbox = Sandbox::new(
            store,
            &self.config.repair.python,
            Duration::from_secs(self.config.repair.run_timeout_secs),
        );
        let log = self.log.clone();

        self.spawn_action("Run", async move {
            let output = sandbox.run().await?;
            log.push(output.to_string());
            Ok(())
        });
    }

    fn status_text(&self) -> String {
        format!(
            "Healer Status:\n\
             ─────────────────────────────\n\
             URL:       {}\n\
             Model:     {} ({})\n\
             WebDriver: {}\n\
             Snapshot:  {}\n\
             Script:    {}\n\
             Attempts:  {}\n\
             Timeout:   {}s\n\
             Activity:  {}",
            self.url.as_deref().unwrap_or("(not set)"),
            self.llm.model(),
            self.llm.name(),
            self.config.browser.webdriver_url,
            self.config.paths.ui_dump.display(),
            self.config.paths.script.display(),
            self.config.repair.max_attempts,
            self.config.repair.run_timeout_secs,
            if self.is_busy() { "busy" } else { "idle" }
        )
    }

    fn print_banner(&self) {
        println!("\nSelenium Healer - interactive shell");
        println!("Model:  {} ({})", self.llm.model(), self.llm.name());
        println!("Script: {}", self.config.paths.script.display());
        println!("Type 'help' for commands.");
        println!("─────────────────────────────────────────");
    }
}
