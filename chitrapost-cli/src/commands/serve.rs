//! HTTP server command

use super::connect;
use crate::load_config;
use anyhow::{Context, Result};
use chitrapost::config::ChitrapostConfig;
use chitrapost::prelude::*;
use chitrapost::store::MIGRATOR;
use chitrapost::{observability, storage};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

type Stores = (Arc<dyn AccountStore>, Arc<dyn UploadRecordStore>);

/// Run the API server until Ctrl-C
pub struct ServeCommand {
    config: Option<PathBuf>,
    in_memory: bool,
}

impl ServeCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: Option<PathBuf>, in_memory: bool) -> Self {
        Self { config, in_memory }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration, an unreachable database,
    /// failed migrations, unusable provider credentials or a bind failure.
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        observability::init(&config.observability)?;
        config.validate().context("invalid configuration")?;

        let provider =
            storage::from_settings(&config.storage).context("failed to configure storage")?;
        let (accounts, records) = self.stores(&config).await?;

        let address = config.server.bind_address();
        let environment = config.environment.clone();
        let state = AppState::new(config, accounts, records, provider)?;

        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        info!(%address, %environment, "chitrapost listening");
        println!(
            "{} {} {}",
            style("Listening").green().bold(),
            style(format!("http://{address}")).cyan(),
            style(format!("({environment})")).dim()
        );

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        info!("chitrapost stopped");
        Ok(())
    }

    async fn stores(&self, config: &ChitrapostConfig) -> Result<Stores> {
        if self.in_memory {
            warn!("using in-memory stores; data is lost on exit");
            return Ok((
                Arc::new(MemoryAccountStore::new()),
                Arc::new(MemoryUploadStore::new()),
            ));
        }

        let pool = connect(&config.database).await?;
        if config.database.run_migrations {
            MIGRATOR
                .run(&pool)
                .await
                .context("failed to run migrations")?;
        }

        let query_timeout = config.database.query_timeout();
        Ok((
            Arc::new(PgAccountStore::new(pool.clone(), query_timeout)),
            Arc::new(PgUploadStore::new(pool, query_timeout)),
        ))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
