//! Apply the database schema

use anyhow::{Context, Result};

use medbook_core::MedbookConfig;

pub async fn run_migrate(config: MedbookConfig) -> Result<()> {
    medbook_server::migrate(&config)
        .await
        .context("Failed to apply migrations")?;
    println!("✓ Schema is up to date");
    Ok(())
}
