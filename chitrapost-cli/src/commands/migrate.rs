//! Migration command

use super::connect;
use crate::load_config;
use anyhow::{Context, Result};
use chitrapost::observability;
use chitrapost::store::MIGRATOR;
use console::style;
use std::path::PathBuf;

/// Apply embedded migrations
pub struct MigrateCommand {
    config: Option<PathBuf>,
}

impl MigrateCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: Option<PathBuf>) -> Self {
        Self { config }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or a migration fails.
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        observability::init(&config.observability)?;

        println!("{} {}", style("Migrating").green().bold(), style("database...").bold());
        let pool = connect(&config.database).await?;
        MIGRATOR
            .run(&pool)
            .await
            .context("failed to run migrations")?;

        for migration in MIGRATOR.iter() {
            println!(
                "  {} {} {}",
                style("✓").green(),
                style(migration.version).dim(),
                migration.description
            );
        }
        println!("{}", style("Database is up to date").green());
        Ok(())
    }
}
