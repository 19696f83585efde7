//! chitrapost: account, token and image upload service
//!
//! Users register with an email and password, exchange credentials for a
//! signed session token, and upload JPEG/PNG images. Images are validated by
//! content, handed to a remote storage provider, and the returned reference
//! is recorded against the uploading account.
//!
//! # Design Principles
//!
//! 1. **Validate before side effects**: malformed input never reaches the
//!    hasher, the store or the network
//! 2. **Stateless sessions**: tokens are verified, never looked up
//! 3. **Record only what exists**: an upload record is written only after the
//!    provider confirms the bytes are stored
//! 4. **Narrow seams**: stores and providers sit behind traits, with
//!    in-memory implementations for tests and local runs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chitrapost::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ChitrapostConfig::load()?;
//!     config.validate()?;
//!     chitrapost::observability::init(&config.observability)?;
//!
//!     let provider = chitrapost::storage::from_settings(&config.storage)?;
//!     let state = AppState::new(
//!         config,
//!         Arc::new(MemoryAccountStore::new()),
//!         Arc::new(MemoryUploadStore::new()),
//!         provider,
//!     )?;
//!
//!     let listener = tokio::net::TcpListener::bind(state.config().server.bind_address()).await?;
//!     axum::serve(listener, router(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`auth`]: password hashing, tokens, accounts, registration and login
//! - [`validation`]: credential validation
//! - [`store`]: account and upload record persistence
//! - [`storage`]: remote object storage and content sniffing
//! - [`upload`]: the upload pipeline
//! - [`handlers`], [`router`], [`extractors`]: the HTTP surface
//! - [`config`], [`observability`], [`state`]: process wiring

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod observability;
pub mod router;
pub mod state;
pub mod storage;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod upload;
pub mod validation;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use chitrapost::prelude::*;
    //! ```

    // Authentication
    pub use crate::auth::{
        Account, AccountError, AccountService, AuthFailure, Authenticated, Claims, EmailAddress,
        PasswordHasher, TokenIssuer,
    };

    // Validation
    pub use crate::validation::{validate_credentials, Credentials, ValidationFailure};

    // Persistence
    pub use crate::store::{
        AccountStore, MemoryAccountStore, MemoryUploadStore, PgAccountStore, PgUploadStore,
        StoreError, UploadRecord, UploadRecordStore,
    };

    // Storage
    pub use crate::storage::{
        CloudinaryStorage, LocalStorage, Locator, ProviderError, RemoteStorage,
    };

    // Uploads
    pub use crate::upload::{ImageUpload, UploadCoordinator, UploadError};

    // HTTP
    pub use crate::error::ApiError;
    pub use crate::router::router;
    pub use crate::state::AppState;

    // Configuration
    pub use crate::config::ChitrapostConfig;
}
