//! CLI command implementations

pub mod check_config;
pub mod migrate;
pub mod serve;

pub use check_config::CheckConfigCommand;
pub use migrate::MigrateCommand;
pub use serve::ServeCommand;

use anyhow::{Context, Result};
use chitrapost::config::DatabaseSettings;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Open the pool and make sure the database answers
///
/// # Errors
///
/// Returns an error if the database is unreachable; this is a startup
/// failure.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.connect_timeout())
        .connect(&settings.url)
        .await
        .context("failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("database ping failed")?;

    Ok(pool)
}
