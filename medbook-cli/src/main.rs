//! medbook CLI - clinic booking backend
//!
//! Entry point for the `medbook` binary:
//! - `serve`: apply the schema, then run the HTTP gateway
//! - `migrate`: apply the schema only
//! - `config`: inspect the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medbook_core::MedbookConfig;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "medbook",
    author,
    version,
    about = "Clinic booking backend: departments, doctors, patients, appointments",
    long_about = "Serve the medbook HTTP gateway over Postgres. Every entity gets the same \
                  filtered CRUD surface with soft and hard delete, prefix search and pagination."
)]
struct Cli {
    /// Config file (default: $MEDBOOK_CONFIG, then ./medbook.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Database URL (overrides [database].url)
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Debug logging unless RUST_LOG is set
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (needs the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway (applies migrations first unless --skip-migrations)
    Serve(commands::serve::ServeArgs),
    /// Create missing tables and indexes
    Migrate,
    /// Show, validate or locate the configuration
    Config(commands::config::ConfigArgs),
}

fn load_config(cli: &Cli) -> Result<MedbookConfig> {
    let mut config = MedbookConfig::resolve(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(url) = cli.database_url.as_ref().filter(|u| !u.is_empty()) {
        config.database.url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let config = load_config(&cli)?;

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await,
        Commands::Migrate => commands::run_migrate(config).await,
        Commands::Config(args) => commands::run_config(args, config, cli.config.as_deref()),
    };

    tracing_setup::shutdown_otel();
    result
}
