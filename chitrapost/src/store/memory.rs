//! In-memory stores
//!
//! Used by the test suite and by `chitrapost serve --in-memory`. Locks are
//! only held inside synchronous sections, never across an `.await`.

use super::{AccountStore, StoreError, UploadId, UploadRecord, UploadRecordStore};
use crate::auth::account::{Account, AccountId, EmailAddress};
use crate::storage::Locator;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct Accounts {
    last_id: AccountId,
    by_id: BTreeMap<AccountId, Account>,
    by_email: HashMap<EmailAddress, AccountId>,
}

/// [`AccountStore`] backed by a map
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Accounts>,
}

impl MemoryAccountStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Delete an account, returning it if it existed
    pub fn remove(&self, id: AccountId) -> Option<Account> {
        let mut inner = self.inner.write();
        let account = inner.by_id.remove(&id)?;
        inner.by_email.remove(&account.email);
        Some(account)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let mut inner = self.inner.write();
        if inner.by_email.contains_key(email) {
            return Err(StoreError::DuplicateKey {
                constraint: "users_email_key".to_string(),
            });
        }

        inner.last_id += 1;
        let account = Account {
            id: inner.last_id,
            email: email.clone(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.by_email.insert(email.clone(), account.id);
        inner.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Account, StoreError> {
        let inner = self.inner.read();
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        self.inner
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

/// [`UploadRecordStore`] backed by a vector
#[derive(Debug, Default)]
pub struct MemoryUploadStore {
    records: Mutex<Vec<UploadRecord>>,
}

impl MemoryUploadStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, oldest first
    #[must_use]
    pub fn records(&self) -> Vec<UploadRecord> {
        self.records.lock().clone()
    }

    /// Number of records
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }
}

#[async_trait]
impl UploadRecordStore for MemoryUploadStore {
    async fn insert(
        &self,
        locator: &Locator,
        owner_id: AccountId,
    ) -> Result<UploadRecord, StoreError> {
        let mut records = self.records.lock();
        let id = UploadId::try_from(records.len())
            .map_err(|e| StoreError::Backend(e.to_string()))?
            + 1;
        let record = UploadRecord {
            id,
            url: locator.clone(),
            owner_id,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }
}
