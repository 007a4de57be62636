//! Run the HTTP gateway

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use medbook_core::MedbookConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides [gateway].bind)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Do not apply the schema before serving
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the HTTP server (blocks until shutdown)
pub async fn run_serve(args: ServeArgs, mut config: MedbookConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.gateway.bind = bind;
    }
    if args.cors_permissive {
        config.gateway.cors_permissive = true;
    }

    tracing::info!("Starting medbook gateway on {}", config.gateway.bind);

    medbook_server::serve(&config, !args.skip_migrations)
        .await
        .context("Server error")?;

    Ok(())
}
