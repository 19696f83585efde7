//! Upload coordination
//!
//! An upload moves through fixed stages, each of which can end it:
//!
//! 1. the account behind the token is resolved (no network egress before
//!    this succeeds)
//! 2. the content is sniffed and must be JPEG or PNG
//! 3. the bytes are handed to the provider in one spawned task, awaited once
//!    under a deadline
//! 4. the returned locator is recorded, only if the provider succeeded
//!
//! # Example
//!
//! ```rust,no_run
//! use chitrapost::upload::{ImageUpload, UploadCoordinator};
//! use chitrapost::auth::Claims;
//!
//! # async fn example(coordinator: UploadCoordinator, claims: Claims) -> anyhow::Result<()> {
//! let file = ImageUpload::new(std::fs::read("photo.png")?);
//! let record = coordinator.upload(&claims, file).await?;
//! println!("stored at {}", record.url);
//! # Ok(())
//! # }
//! ```

use crate::auth::token::Claims;
use crate::storage::{sniff, Locator, ProviderError, RemoteStorage};
use crate::store::{AccountStore, StoreError, UploadRecord, UploadRecordStore};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A buffered file taken from a request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Full file content
    pub bytes: Bytes,
    /// Client-supplied filename, informational only
    pub file_name: Option<String>,
    /// Client-declared content type, informational only
    pub declared_type: Option<String>,
}

impl ImageUpload {
    /// Wrap raw bytes with no client metadata
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            declared_type: None,
        }
    }
}

/// Upload failures
#[derive(Debug, Error)]
pub enum UploadError {
    /// The token is valid but its account no longer exists
    #[error("Account no longer exists")]
    AccountNotFound,

    /// Content is not JPEG or PNG
    #[error("Unsupported content: {}", detected.unwrap_or("unknown"))]
    UnsupportedContent {
        /// Detected MIME type, if recognisable
        detected: Option<&'static str>,
    },

    /// The provider did not store the bytes
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Account lookup or record insert failed
    #[error(transparent)]
    Store(StoreError),
}

/// Runs the upload stages against the configured stores and provider
///
/// Cheap to clone; all collaborators are behind `Arc`.
#[derive(Clone)]
pub struct UploadCoordinator {
    accounts: Arc<dyn AccountStore>,
    records: Arc<dyn UploadRecordStore>,
    provider: Arc<dyn RemoteStorage>,
    namespace: Arc<str>,
    handoff_timeout: Duration,
}

impl fmt::Debug for UploadCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCoordinator")
            .field("namespace", &self.namespace)
            .field("handoff_timeout", &self.handoff_timeout)
            .finish_non_exhaustive()
    }
}

impl UploadCoordinator {
    /// Default namespace (provider folder)
    pub const DEFAULT_NAMESPACE: &'static str = "chitrapost";

    /// Default hand-off deadline
    pub const DEFAULT_HANDOFF_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a coordinator
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        records: Arc<dyn UploadRecordStore>,
        provider: Arc<dyn RemoteStorage>,
        namespace: &str,
        handoff_timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            records,
            provider,
            namespace: Arc::from(namespace),
            handoff_timeout,
        }
    }

    /// Validate, offload and record one upload
    ///
    /// # Errors
    ///
    /// - [`UploadError::AccountNotFound`] when the token's account is gone
    /// - [`UploadError::UnsupportedContent`] for anything but JPEG/PNG
    /// - [`UploadError::Provider`] when the hand-off fails or times out
    /// - [`UploadError::Store`] for store failures
    ///
    /// Only the last stage writes; every earlier failure leaves no record.
    pub async fn upload(
        &self,
        claims: &Claims,
        file: ImageUpload,
    ) -> Result<UploadRecord, UploadError> {
        let account = self
            .accounts
            .find_by_id(claims.id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => UploadError::AccountNotFound,
                other => UploadError::Store(other),
            })?;

        let kind = sniff(&file.bytes).map_err(|unsupported| {
            debug!(
                owner_id = account.id,
                detected = unsupported.detected,
                declared = file.declared_type.as_deref(),
                "rejected upload content"
            );
            UploadError::UnsupportedContent {
                detected: unsupported.detected,
            }
        })?;

        let size = file.bytes.len();
        let locator = self.hand_off(file.bytes).await?;

        match self.records.insert(&locator, account.id).await {
            Ok(record) => {
                info!(
                    upload_id = record.id,
                    owner_id = account.id,
                    %kind,
                    size,
                    url = %record.url,
                    "upload recorded"
                );
                Ok(record)
            }
            Err(e) => {
                warn!(
                    owner_id = account.id,
                    url = %locator,
                    error = %e,
                    "remote object stored but not recorded"
                );
                Err(UploadError::Store(e))
            }
        }
    }

    async fn hand_off(&self, bytes: Bytes) -> Result<Locator, ProviderError> {
        let provider = Arc::clone(&self.provider);
        let namespace = Arc::clone(&self.namespace);
        let mut handle = tokio::spawn(async move { provider.upload(bytes, &namespace).await });

        match tokio::time::timeout(self.handoff_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ProviderError::TaskFailed(join_error.to_string())),
            Err(_) => {
                handle.abort();
                warn!(timeout = ?self.handoff_timeout, "provider hand-off timed out");
                Err(ProviderError::TimedOut)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::account::{Account, EmailAddress};
    use crate::storage::MockRemoteStorage;
    use crate::store::{MemoryUploadStore, MockAccountStore, MockUploadRecordStore};
    use crate::testing::ScriptedStorage;
    use async_trait::async_trait;
    use chrono::Utc;

    const PNG: [u8; 16] = [
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
    ];

    fn claims(id: i64) -> Claims {
        Claims {
            id,
            email: "a@x.com".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    fn account(id: i64) -> Account {
        Account {
            id,
            email: EmailAddress::parse("a@x.com").unwrap(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn existing_account() -> MockAccountStore {
        let mut accounts = MockAccountStore::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(account(id)));
        accounts
    }

    fn coordinator(
        accounts: MockAccountStore,
        records: MockUploadRecordStore,
        provider: impl RemoteStorage + 'static,
    ) -> UploadCoordinator {
        UploadCoordinator::new(
            Arc::new(accounts),
            Arc::new(records),
            Arc::new(provider),
            UploadCoordinator::DEFAULT_NAMESPACE,
            UploadCoordinator::DEFAULT_HANDOFF_TIMEOUT,
        )
    }

    #[tokio::test]
    async fn test_success_records_locator_for_owner() {
        let mut provider = MockRemoteStorage::new();
        provider
            .expect_upload()
            .withf(|bytes, namespace| bytes.len() == PNG.len() && namespace.to_string() == "chitrapost")
            .times(1)
            .returning(|_, _| Ok(Locator::new("https://cdn.example.com/p.png")));

        let mut records = MockUploadRecordStore::new();
        records
            .expect_insert()
            .withf(|locator, owner_id| {
                locator.as_str() == "https://cdn.example.com/p.png" && *owner_id == 7
            })
            .times(1)
            .returning(|locator, owner_id| {
                Ok(UploadRecord {
                    id: 1,
                    url: locator.clone(),
                    owner_id,
                    created_at: Utc::now(),
                })
            });

        let record = coordinator(existing_account(), records, provider)
            .upload(&claims(7), ImageUpload::new(PNG.to_vec()))
            .await
            .unwrap();
        assert_eq!(record.owner_id, 7);
        assert_eq!(record.url.as_str(), "https://cdn.example.com/p.png");
    }

    #[tokio::test]
    async fn test_full_content_reaches_provider_not_just_sniffed_prefix() {
        let mut content = PNG.to_vec();
        content.extend((0..100_000u32).map(|i| u8::try_from(i % 251).unwrap()));
        assert!(content.len() > crate::storage::SNIFF_LEN);

        let provider = Arc::new(ScriptedStorage::succeeding("https://cdn.test"));
        let records = Arc::new(MemoryUploadStore::new());
        let coordinator = UploadCoordinator::new(
            Arc::new(existing_account()),
            Arc::clone(&records) as Arc<dyn UploadRecordStore>,
            Arc::clone(&provider) as Arc<dyn RemoteStorage>,
            UploadCoordinator::DEFAULT_NAMESPACE,
            UploadCoordinator::DEFAULT_HANDOFF_TIMEOUT,
        );

        coordinator
            .upload(&claims(7), ImageUpload::new(content.clone()))
            .await
            .unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].bytes.as_ref(), content.as_slice());
        assert_eq!(records.count(), 1);
    }

    #[tokio::test]
    async fn test_vanished_account_never_reaches_provider() {
        let mut accounts = MockAccountStore::new();
        accounts
            .expect_find_by_id()
            .returning(|_| Err(StoreError::NotFound));
        let mut provider = MockRemoteStorage::new();
        provider.expect_upload().times(0);
        let mut records = MockUploadRecordStore::new();
        records.expect_insert().times(0);

        let err = coordinator(accounts, records, provider)
            .upload(&claims(1), ImageUpload::new(PNG.to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::AccountNotFound));
    }

    #[tokio::test]
    async fn test_store_failure_on_lookup_is_store_error() {
        let mut accounts = MockAccountStore::new();
        accounts
            .expect_find_by_id()
            .returning(|_| Err(StoreError::Timeout));
        let mut provider = MockRemoteStorage::new();
        provider.expect_upload().times(0);

        let err = coordinator(accounts, MockUploadRecordStore::new(), provider)
            .upload(&claims(1), ImageUpload::new(PNG.to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Store(StoreError::Timeout)));
    }

    #[tokio::test]
    async fn test_unsupported_content_never_reaches_provider() {
        for content in [b"plain text".to_vec(), b"GIF89a\0\0\0\0".to_vec(), Vec::new()] {
            let mut provider = MockRemoteStorage::new();
            provider.expect_upload().times(0);
            let mut records = MockUploadRecordStore::new();
            records.expect_insert().times(0);

            let file = ImageUpload {
                bytes: Bytes::from(content),
                file_name: Some("photo.png".to_string()),
                declared_type: Some("image/png".to_string()),
            };
            let err = coordinator(existing_account(), records, provider)
                .upload(&claims(1), file)
                .await
                .unwrap_err();
            assert!(matches!(err, UploadError::UnsupportedContent { .. }));
        }
    }

    #[tokio::test]
    async fn test_provider_failure_creates_no_record() {
        let mut provider = MockRemoteStorage::new();
        provider.expect_upload().times(1).returning(|_, _| {
            Err(ProviderError::Rejected {
                status: 401,
                message: "Invalid Signature".to_string(),
            })
        });
        let mut records = MockUploadRecordStore::new();
        records.expect_insert().times(0);

        let err = coordinator(existing_account(), records, provider)
            .upload(&claims(1), ImageUpload::new(PNG.to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::Provider(ProviderError::Rejected { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_record_failure_after_upload_is_store_error() {
        let mut provider = MockRemoteStorage::new();
        provider
            .expect_upload()
            .returning(|_, _| Ok(Locator::new("https://cdn.example.com/orphan.png")));
        let mut records = MockUploadRecordStore::new();
        records
            .expect_insert()
            .times(1)
            .returning(|_, _| Err(StoreError::Backend("connection reset".to_string())));

        let err = coordinator(existing_account(), records, provider)
            .upload(&claims(1), ImageUpload::new(PNG.to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Store(StoreError::Backend(_))));
    }

    struct StalledProvider;

    #[async_trait]
    impl RemoteStorage for StalledProvider {
        async fn upload(&self, _: Bytes, _: &str) -> Result<Locator, ProviderError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_provider_times_out_without_record() {
        let mut records = MockUploadRecordStore::new();
        records.expect_insert().times(0);

        let err = coordinator(existing_account(), records, StalledProvider)
            .upload(&claims(1), ImageUpload::new(PNG.to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Provider(ProviderError::TimedOut)));
    }

    struct PanickingProvider;

    #[async_trait]
    impl RemoteStorage for PanickingProvider {
        async fn upload(&self, _: Bytes, _: &str) -> Result<Locator, ProviderError> {
            panic!("provider blew up")
        }
    }

    #[tokio::test]
    async fn test_panicking_provider_is_task_failure() {
        let mut records = MockUploadRecordStore::new();
        records.expect_insert().times(0);

        let err = coordinator(existing_account(), records, PanickingProvider)
            .upload(&claims(1), ImageUpload::new(PNG.to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Provider(ProviderError::TaskFailed(_))));
    }
}
