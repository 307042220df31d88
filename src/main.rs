//! news-integrations command line entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use news_integrations::{
    logging, Config, ConfigOverrides, EnvCredentialsResolver, IntegrationRegistry, LogFormat,
    NewsApiGetSources,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "news-integrations", version, about = "Run news provider integrations")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format: human, compact or json
    #[arg(long, global = true, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,

    /// Override the NewsAPI base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print metadata for every registered integration
    List,
    /// List NewsAPI sources (API key from $NEWSAPI_API_KEY)
    Sources {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::from_arg(s).ok_or_else(|| format!("unknown log format '{s}'"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load settings")?;
    config
        .apply_overrides(&ConfigOverrides {
            base_url: cli.base_url,
            timeout_secs: cli.timeout_secs,
            log_level: cli.log_level,
            log_format: cli.log_format,
        })
        .context("Invalid command line settings")?;

    logging::init(&config.logging)?;

    let registry = IntegrationRegistry::with_defaults(&config)?;

    match cli.command {
        Command::List => {
            print_json(&serde_json::to_value(registry.list_metadata())?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Sources {
            language,
            country,
            category,
        } => {
            let resolver = EnvCredentialsResolver::new();
            let filters = json!({
                "language": language,
                "country": country,
                "category": category,
            });
            let result = registry
                .execute(NewsApiGetSources::ID, filters, &resolver)
                .await;
            print_json(&result)?;

            if result["status"] == "success" {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
