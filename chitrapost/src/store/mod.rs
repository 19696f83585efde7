//! Persistence for accounts and upload records
//!
//! Both stores are consumed through narrow traits so the services above them
//! never see `sqlx` types. Driver errors are mapped into [`StoreError`]
//! exactly once, by [`classify`], at the boundary.
//!
//! Two implementations ship with the crate:
//!
//! - [`postgres`]: `sqlx::PgPool` backed, with embedded migrations
//! - [`memory`]: `parking_lot` guarded maps for tests and local runs

pub mod memory;
pub mod postgres;

use crate::auth::account::{Account, AccountId, EmailAddress};
use crate::storage::Locator;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub use memory::{MemoryAccountStore, MemoryUploadStore};
pub use postgres::{PgAccountStore, PgUploadStore, MIGRATOR};

/// Store-assigned upload record identifier
pub type UploadId = i64;

/// Durable reference to an image held by the remote provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UploadRecord {
    /// Record ID (primary key)
    pub id: UploadId,
    /// Locator returned by the provider
    pub url: Locator,
    /// Owning account
    pub owner_id: AccountId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Store errors, independent of the driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate key violates {constraint}")]
    DuplicateKey {
        /// Name of the violated constraint
        constraint: String,
    },

    /// No row matched
    #[error("Record not found")]
    NotFound,

    /// The query or pool acquisition did not finish in time
    #[error("Store operation timed out")]
    Timeout,

    /// Anything else the backend reported
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Map a driver error onto [`StoreError`]
#[must_use]
pub fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey {
            constraint: db.constraint().unwrap_or("unique").to_string(),
        },
        other => StoreError::Backend(other.to_string()),
    }
}

/// Run one query under its own deadline
///
/// # Errors
///
/// [`StoreError::Timeout`] when `limit` elapses, otherwise the classified
/// driver error.
pub async fn bounded<T, F>(limit: Duration, query: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>> + Send,
{
    tokio::time::timeout(limit, query)
        .await
        .map_err(|_| StoreError::Timeout)?
        .map_err(classify)
}

/// Account persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateKey`] if the email is already registered.
    async fn insert(&self, email: &EmailAddress, password_hash: &str)
        -> Result<Account, StoreError>;

    /// Look an account up by its (normalised) email
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no account has this email.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Account, StoreError>;

    /// Look an account up by id
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the account does not exist.
    async fn find_by_id(&self, id: AccountId) -> Result<Account, StoreError>;
}

/// Upload record persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadRecordStore: Send + Sync {
    /// Record a stored image for `owner_id`
    ///
    /// # Errors
    ///
    /// Any [`StoreError`]; a missing owner surfaces as
    /// [`StoreError::Backend`] from the foreign key.
    async fn insert(&self, locator: &Locator, owner_id: AccountId)
        -> Result<UploadRecord, StoreError>;
}
