//! Application state
//!
//! Built once at startup and cloned into every handler. Holds no
//! request-level mutable state.

use crate::auth::{AccountService, PasswordHasher, TokenIssuer};
use crate::config::ChitrapostConfig;
use crate::storage::RemoteStorage;
use crate::store::{AccountStore, UploadRecordStore};
use crate::upload::UploadCoordinator;
use anyhow::Context;
use std::sync::Arc;

/// Shared handles for handlers and extractors
///
/// # Example
///
/// ```rust,no_run
/// use chitrapost::{config::ChitrapostConfig, router, state::AppState};
/// use chitrapost::storage::LocalStorage;
/// use chitrapost::store::{MemoryAccountStore, MemoryUploadStore};
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let mut config = ChitrapostConfig::default();
/// config.auth.jwt_secret = "dev-secret".to_string();
///
/// let state = AppState::new(
///     config,
///     Arc::new(MemoryAccountStore::new()),
///     Arc::new(MemoryUploadStore::new()),
///     Arc::new(LocalStorage::new("./media", "/media")?),
/// )?;
/// let app = router::router(state);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<ChitrapostConfig>,
    accounts: AccountService,
    uploads: UploadCoordinator,
    tokens: TokenIssuer,
}

impl AppState {
    /// Wire services from configuration and collaborator handles
    ///
    /// # Errors
    ///
    /// Returns an error if the token issuer cannot be built (empty secret or
    /// out-of-range ttl).
    pub fn new(
        config: ChitrapostConfig,
        accounts: Arc<dyn AccountStore>,
        records: Arc<dyn UploadRecordStore>,
        provider: Arc<dyn RemoteStorage>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenIssuer::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl())
            .context("invalid token configuration")?;
        let uploads = UploadCoordinator::new(
            Arc::clone(&accounts),
            records,
            provider,
            &config.storage.namespace,
            config.storage.handoff_timeout(),
        );

        Ok(Self {
            accounts: AccountService::new(accounts, tokens.clone()),
            uploads,
            tokens,
            config: Arc::new(config),
        })
    }

    /// Replace the password hasher
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.accounts = self.accounts.with_hasher(hasher);
        self
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &ChitrapostConfig {
        &self.config
    }

    /// Registration and login
    #[must_use]
    pub const fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    /// Upload pipeline
    #[must_use]
    pub const fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    /// Token verification for extractors
    #[must_use]
    pub const fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockRemoteStorage;
    use crate::store::{MemoryAccountStore, MemoryUploadStore};

    fn config() -> ChitrapostConfig {
        let mut config = ChitrapostConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        config
    }

    fn state(config: ChitrapostConfig) -> anyhow::Result<AppState> {
        AppState::new(
            config,
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryUploadStore::new()),
            Arc::new(MockRemoteStorage::new()),
        )
    }

    #[test]
    fn test_empty_secret_fails_startup() {
        assert!(state(ChitrapostConfig::default()).is_err());
    }

    #[test]
    fn test_clone_shares_config() {
        let state = state(config()).unwrap();
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
    }

    #[test]
    fn test_tokens_use_configured_secret() {
        let state = state(config()).unwrap();
        let token = state.tokens().issue(1, "a@x.com").unwrap();

        let issuer = TokenIssuer::new(b"secret", TokenIssuer::DEFAULT_TTL).unwrap();
        assert_eq!(issuer.verify(&token).unwrap().id, 1);
    }
}
