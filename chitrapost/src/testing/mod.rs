//! Testing utilities
//!
//! Built for this crate's own tests and, through the `testing` feature, for
//! integration tests. Never part of a release build.
//!
//! - [`ScriptedStorage`]: a provider that records calls and answers from a
//!   script
//! - [`TestContext`]: application state over in-memory stores, with handles
//!   kept for assertions
//! - [`cheap_hasher`]: Argon2id with minimal cost, for fast tests
//!
//! # Example
//!
//! ```rust,no_run
//! use chitrapost::testing::{ScriptedStorage, TestContext};
//!
//! # fn example() -> anyhow::Result<()> {
//! let ctx = TestContext::new(ScriptedStorage::succeeding("https://cdn.test"))?;
//! let app = chitrapost::router::router(ctx.state.clone());
//! assert_eq!(ctx.uploads.count(), 0);
//! # Ok(())
//! # }
//! ```

mod storage;

pub use storage::{ScriptedStorage, StorageCall};

use crate::auth::PasswordHasher;
use crate::config::{ChitrapostConfig, StorageBackend};
use crate::state::AppState;
use crate::store::{MemoryAccountStore, MemoryUploadStore};
use std::sync::Arc;

/// Secret used by [`TestContext::config`]
pub const TEST_JWT_SECRET: &str = "test-secret";

/// Argon2id with a minimal cost
#[must_use]
pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::builder()
        .memory_cost(1024)
        .iterations(1)
        .build()
        .unwrap_or_default()
}

/// Application state wired to in-memory collaborators
#[derive(Debug, Clone)]
pub struct TestContext {
    /// State to hand to the router
    pub state: AppState,
    /// Account store behind `state`
    pub accounts: Arc<MemoryAccountStore>,
    /// Upload record store behind `state`
    pub uploads: Arc<MemoryUploadStore>,
    /// Provider behind `state`
    pub storage: Arc<ScriptedStorage>,
}

impl TestContext {
    /// Configuration used by [`TestContext::new`]
    #[must_use]
    pub fn config() -> ChitrapostConfig {
        let mut config = ChitrapostConfig::default();
        config.environment = "test".to_string();
        config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
        config.storage.backend = StorageBackend::Local;
        config
    }

    /// Build with [`TestContext::config`]
    ///
    /// # Errors
    ///
    /// Same as [`AppState::new`].
    pub fn new(storage: ScriptedStorage) -> anyhow::Result<Self> {
        Self::with_config(Self::config(), storage)
    }

    /// Build with a custom configuration
    ///
    /// # Errors
    ///
    /// Same as [`AppState::new`].
    pub fn with_config(config: ChitrapostConfig, storage: ScriptedStorage) -> anyhow::Result<Self> {
        let accounts = Arc::new(MemoryAccountStore::new());
        let uploads = Arc::new(MemoryUploadStore::new());
        let storage = Arc::new(storage);

        let state = AppState::new(
            config,
            accounts.clone(),
            uploads.clone(),
            storage.clone(),
        )?
        .with_hasher(cheap_hasher());

        Ok(Self {
            state,
            accounts,
            uploads,
            storage,
        })
    }
}
