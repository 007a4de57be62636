//! Inspect the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use medbook_core::config::{CONFIG_ENV, DEFAULT_CONFIG_FILE};
use medbook_core::MedbookConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML, password hidden (default)
    Show,
    /// Check the configuration and report problems
    Validate,
    /// Show which config file would be read
    Path,
}

/// `explicit` is the `--config` argument, if any.
pub fn run_config(args: ConfigArgs, config: MedbookConfig, explicit: Option<&Path>) -> Result<()> {
    match args.command.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => run_show(&config),
        ConfigCommands::Validate => run_validate(&config),
        ConfigCommands::Path => run_path(explicit),
    }
}

fn run_show(config: &MedbookConfig) -> Result<()> {
    let mut shown = config.clone();
    shown.database.url = redact(&shown.database.url);
    let rendered = shown.to_toml().context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

fn run_validate(config: &MedbookConfig) -> Result<()> {
    config.validate()?;
    println!("✓ Configuration is valid");
    println!(
        "  database: {} (max {} connections)",
        redact(&config.database.url),
        config.database.max_connections
    );
    println!("  gateway:  {}", config.gateway.bind);
    println!(
        "  timeouts: booking {}s, healthcare {}s, user {}s",
        config.services.booking.context_timeout_secs,
        config.services.healthcare.context_timeout_secs,
        config.services.user.context_timeout_secs
    );
    Ok(())
}

fn run_path(explicit: Option<&Path>) -> Result<()> {
    if let Some(path) = explicit {
        println!("{} (from --config)", path.display());
    } else if let Some(path) = std::env::var_os(CONFIG_ENV) {
        println!("{} (from {})", Path::new(&path).display(), CONFIG_ENV);
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        println!("{}", DEFAULT_CONFIG_FILE);
    } else {
        println!("(none, using defaults)");
    }
    Ok(())
}

/// Hide the password part of a connection URL.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            let credentials = &url[scheme + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:****{}", &url[..scheme + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
