//! PostgreSQL stores
//!
//! Every query runs under the configured per-query deadline; none shares a
//! deadline with another.

use super::{bounded, AccountStore, StoreError, UploadRecord, UploadRecordStore};
use crate::auth::account::{Account, AccountId, EmailAddress};
use crate::storage::Locator;
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use std::time::Duration;

/// Embedded schema migrations (`users`, `uploads`)
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// [`AccountStore`] over the `users` table
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgAccountStore {
    /// Wrap a pool
    #[must_use]
    pub const fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, Account>(
                r"
                INSERT INTO users (email, password_hash)
                VALUES ($1, $2)
                RETURNING id, email, password_hash, created_at
                ",
            )
            .bind(email.as_str())
            .bind(password_hash)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Account, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, Account>(
                r"
                SELECT id, email, password_hash, created_at
                FROM users
                WHERE email = $1
                ",
            )
            .bind(email.as_str())
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, Account>(
                r"
                SELECT id, email, password_hash, created_at
                FROM users
                WHERE id = $1
                ",
            )
            .bind(id)
            .fetch_one(&self.pool),
        )
        .await
    }
}

/// [`UploadRecordStore`] over the `uploads` table
#[derive(Debug, Clone)]
pub struct PgUploadStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgUploadStore {
    /// Wrap a pool
    #[must_use]
    pub const fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl UploadRecordStore for PgUploadStore {
    async fn insert(
        &self,
        locator: &Locator,
        owner_id: AccountId,
    ) -> Result<UploadRecord, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, UploadRecord>(
                r"
                INSERT INTO uploads (url, owner_id)
                VALUES ($1, $2)
                RETURNING id, url, owner_id, created_at
                ",
            )
            .bind(locator.as_str())
            .bind(owner_id)
            .fetch_one(&self.pool),
        )
        .await
    }
}
