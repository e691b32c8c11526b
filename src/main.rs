//! Selenium Healer
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use selenium_healer::cli::{parse_target_url, prompt_for_url};
use selenium_healer::core::config::ProviderType;
use selenium_healer::{create_provider, Config, Driver, RepairOutcome, Shell};
use tracing_subscriber::EnvFilter;

/// Selenium Healer - repair broken Selenium locators against the live page
#[derive(Parser, Debug)]
#[command(name = "selenium-healer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Website URL (prompted for when omitted)
    #[arg(long, short = 'u')]
    url: Option<String>,

    /// Model provider (openrouter, gemini)
    #[arg(long, short = 'p')]
    provider: Option<ProviderType>,

    /// Model identifier
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// WebDriver endpoint
    #[arg(long)]
    webdriver: Option<String>,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Script to repair
    #[arg(long, short = 's')]
    script: Option<PathBuf>,

    /// Maximum repair attempts
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_attempts: Option<usize>,

    /// Script run timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Start the interactive shell
    #[arg(long)]
    shell: bool,
}

fn init_logging(debug: bool) {
    let default = if debug {
        "selenium_healer=debug,info"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(provider) = args.provider {
        config.llm.provider = provider;
    }

    if let Some(ref model) = args.model {
        config.llm.model = Some(model.clone());
    }

    if let Some(ref webdriver) = args.webdriver {
        config.browser.webdriver_url = webdriver.clone();
    }

    if args.headless {
        config.browser.headless = true;
    }

    if let Some(ref script) = args.script {
        config.paths.script = script.clone();
    }

    if let Some(max_attempts) = args.max_attempts {
        config.repair.max_attempts = max_attempts;
    }

    if let Some(timeout) = args.timeout {
        config.repair.run_timeout_secs = timeout;
    }

    if args.debug {
        config.repair.debug = true;
    }

    init_logging(config.repair.debug);

    // Fails before any attempt when credentials are missing
    let llm = create_provider(&config)?;

    if args.shell {
        let url = match args.url {
            Some(ref url) => Some(parse_target_url(url)?.to_string()),
            None => None,
        };
        let mut shell = Shell::new(config, llm, url);
        shell.run().await?;
        return Ok(());
    }

    let url = match args.url {
        Some(ref url) => parse_target_url(url)?,
        None => prompt_for_url()?,
    };

    let outcome = Driver::new(config, llm).run(&url).await?;
    if let RepairOutcome::GaveUp { attempts, .. } = outcome {
        anyhow::bail!("no valid script after {} attempts", attempts);
    }

    Ok(())
}
