//! Shell commands
//!
//! Parsing of the lines typed into the interactive shell.

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Set the target URL
    SetUrl(String),
    /// Print the target URL
    ShowUrl,
    /// Capture the page into the snapshot file
    Dump,
    /// Capture, then repair and run the script
    Agent,
    /// Run the script as it is
    Run,
    ShowUi,
    ShowScript,
    /// Print the status log
    Log,
    /// Print the active configuration as TOML
    ShowConfig,
    /// Write the active configuration to the config file
    SaveConfig,
    Status,
    Help,
    Exit,
    /// Unrecognized input
    Unknown(String),
    /// Blank line
    Empty,
}

/// Parse one input line
pub fn parse_command(input: &str) -> ShellCommand {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "" => ShellCommand::Empty,
        "exit" | "quit" | "q" => ShellCommand::Exit,
        "help" | "?" => ShellCommand::Help,
        "url" if args.is_empty() => ShellCommand::ShowUrl,
        "url" => ShellCommand::SetUrl(args.to_string()),
        "dump" => ShellCommand::Dump,
        "agent" | "repair" => ShellCommand::Agent,
        "run" => ShellCommand::Run,
        "log" => ShellCommand::Log,
        "status" => ShellCommand::Status,
        "config" => match args.to_lowercase().as_str() {
            "" | "show" => ShellCommand::ShowConfig,
            "save" => ShellCommand::SaveConfig,
            _ => ShellCommand::Unknown(input.to_string()),
        },
        "show" => match args.to_lowercase().as_str() {
            "ui" => ShellCommand::ShowUi,
            "script" => ShellCommand::ShowScript,
            _ => ShellCommand::Unknown(input.to_string()),
        },
        _ => ShellCommand::Unknown(input.to_string()),
    }
}

impl ShellCommand {
    /// Whether the command starts a background action
    pub fn is_action(&self) -> bool {
        matches!(self, ShellCommand::Dump | ShellCommand::Agent | ShellCommand::Run)
    }
}

/// Get help text
pub fn help_text() -> String {
    r#"Shell Commands:
  url <address>   Set the website URL
  url             Show the current URL
  dump            Capture UI elements into the snapshot file
  agent           Capture UI, then repair and run the script
  run             Run the script as it is
  show ui         Print the captured UI elements
  show script     Print the current script
  log             Print the status log
  status          Show configuration and activity
  config          Print the active configuration
  config save     Write the active configuration to the config file
  help            Show this help
  exit            Leave the shell

Only one of dump/agent/run can be in progress at a time."#
        .to_string()
}
