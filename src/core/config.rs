//! Configuration management for the healer
//!
//! Supports environment variables, config files, and runtime overrides.
//! API credentials are read from the environment only and never written
//! to disk.
//!
//! Config file location: ~/.config/selenium-healer/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{HealerError, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// WebDriver configuration
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Snapshot and script locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Repair loop and sandbox bounds
    #[serde(default)]
    pub repair: RepairConfig,
}

/// Which remote text-generation API to call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenRouter, or any OpenAI-compatible endpoint via `base_url`
    #[default]
    OpenRouter,
    /// Google Generative Language API
    Gemini,
}

impl std::str::FromStr for ProviderType {
    type Err = HealerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openrouter" | "openai" => Ok(ProviderType::OpenRouter),
            "gemini" | "google" => Ok(ProviderType::Gemini),
            other => Err(HealerError::config(format!("Unknown provider: {}", other))),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::OpenRouter => write!(f, "openrouter"),
            ProviderType::Gemini => write!(f, "gemini"),
        }
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider backend
    pub provider: ProviderType,
    /// Model name; provider default when unset
    pub model: Option<String>,
    /// API base URL override
    pub base_url: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// OpenRouter credential (environment only)
    #[serde(skip)]
    pub openrouter_api_key: Option<String>,
    /// Gemini credential (environment only)
    #[serde(skip)]
    pub gemini_api_key: Option<String>,
}

/// WebDriver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver server (chromedriver / geckodriver)
    pub webdriver_url: String,
    /// Browser to request: chrome or firefox
    pub browser: String,
    /// Run without a visible window
    pub headless: bool,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Snapshot output
    pub ui_dump: PathBuf,
    /// Automation script under repair
    pub script: PathBuf,
}

/// Repair loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Maximum model attempts per repair
    /// Default: 3
    pub max_attempts: usize,
    /// Wall-clock bound for running the script
    /// Default: 60
    pub run_timeout_secs: u64,
    /// Python interpreter used for validation and execution
    pub python: String,
    /// Whether to show debug output
    pub debug: bool,
}

pub const OPENROUTER_DEFAULT_MODEL: &str = "meta-llama/llama-3-8b-instruct";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_key(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary)
        .or_else(|_| env::var(fallback))
        .ok()
        .filter(|k| !k.trim().is_empty())
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: env::var("HEALER_PROVIDER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_default(),
            model: env::var("HEALER_MODEL").ok(),
            base_url: None,
            temperature: 0.0,
            timeout_secs: 120,
            openrouter_api_key: None,
            gemini_api_key: None,
        };
        config.load_credentials();
        config
    }
}

impl LlmConfig {
    /// Read API credentials from the process environment
    pub fn load_credentials(&mut self) {
        self.openrouter_api_key = env_key("OPENROUTER_API_KEY", "openrouter_API_KEY");
        self.gemini_api_key = env_key("GEMINI_API_KEY", "API_KEY");
    }

    /// Resolved model name for the selected provider
    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, ProviderType::OpenRouter) => OPENROUTER_DEFAULT_MODEL,
            (None, ProviderType::Gemini) => GEMINI_DEFAULT_MODEL,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: env::var("HEALER_WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:9515".to_string()),
            browser: env::var("HEALER_BROWSER").unwrap_or_else(|_| "chrome".to_string()),
            headless: env_flag("HEALER_HEADLESS", false),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ui_dump: PathBuf::from("ui_dump.json"),
            script: PathBuf::from("selenium_action_script.py"),
        }
    }
}

impl Default for RepairConfig {
    fn default() -> Self {
        let default_python = if cfg!(windows) { "python" } else { "python3" };
        Self {
            max_attempts: 3,
            run_timeout_secs: 60,
            python: env::var("HEALER_PYTHON").unwrap_or_else(|_| default_python.to_string()),
            debug: env_flag("HEALER_DEBUG", false),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("selenium-healer")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = Self::config_file();
        let mut config = if config_path.exists() {
            match Self::load_from_file() {
                Ok(config) => config,
                Err(e) => {
                    // Logging is not initialized yet
                    eprintln!("Warning: ignoring {}: {}", config_path.display(), e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.llm.load_credentials();
        config
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(HealerError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| HealerError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HealerError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| HealerError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| HealerError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| HealerError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Render the current configuration as TOML for display
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let config = Config::default();
        assert_eq!(config.repair.max_attempts, 3);
        assert_eq!(config.repair.run_timeout_secs, 60);
        assert_eq!(config.paths.ui_dump, PathBuf::from("ui_dump.json"));
        assert_eq!(
            config.paths.script,
            PathBuf::from("selenium_action_script.py")
        );
    }

    #[test]
    fn test_model_defaults_follow_provider() {
        let mut llm = LlmConfig::default();
        llm.model = None;
        llm.provider = ProviderType::OpenRouter;
        assert_eq!(llm.model(), OPENROUTER_DEFAULT_MODEL);
        llm.provider = ProviderType::Gemini;
        assert_eq!(llm.model(), GEMINI_DEFAULT_MODEL);
        llm.model = Some("custom/model".into());
        assert_eq!(llm.model(), "custom/model");
    }

    #[test]
    fn test_credentials_not_serialized() {
        let mut config = Config::default();
        config.llm.openrouter_api_key = Some("sk-secret".into());
        let toml_str = config.to_toml();
        assert!(toml_str.contains("max_attempts"));
        assert!(!toml_str.contains("sk-secret"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [repair]
            max_attempts = 5
            run_timeout_secs = 10
            python = "python3.12"
            debug = true
            "#,
        )
        .unwrap();
        assert_eq!(config.repair.max_attempts, 5);
        assert_eq!(config.repair.python, "python3.12");
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn test_single_key_sections_fill_defaults() {
        let config = Config::from_toml("[llm]\nprovider = \"gemini\"\n").unwrap();
        assert_eq!(config.llm.provider, ProviderType::Gemini);
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.llm.temperature, 0.0);

        let config = Config::from_toml("[repair]\nmax_attempts = 5\n").unwrap();
        assert_eq!(config.repair.max_attempts, 5);
        assert_eq!(config.repair.run_timeout_secs, 60);

        let config = Config::from_toml("[paths]\nscript = \"login.py\"\n").unwrap();
        assert_eq!(config.paths.script, PathBuf::from("login.py"));
        assert_eq!(config.paths.ui_dump, PathBuf::from("ui_dump.json"));

        let config = Config::from_toml("[browser]\nheadless = true\n").unwrap();
        assert!(config.browser.headless);
        assert!(!config.browser.browser.is_empty());
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(
            "Gemini".parse::<ProviderType>().unwrap(),
            ProviderType::Gemini
        );
        assert!("ollama-cloud".parse::<ProviderType>().is_err());
    }
}
