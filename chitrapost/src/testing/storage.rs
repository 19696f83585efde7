//! Scripted remote storage

use crate::storage::{Locator, ProviderError, RemoteStorage};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

#[derive(Debug, Clone)]
enum Outcome {
    Succeed { base: String },
    Fail(ProviderError),
    Stall,
}

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCall {
    /// Bytes received
    pub bytes: Bytes,
    /// Namespace received
    pub namespace: String,
}

/// [`RemoteStorage`] that records calls and answers from a script
///
/// # Example
///
/// ```rust
/// use chitrapost::testing::ScriptedStorage;
///
/// let storage = ScriptedStorage::succeeding("https://cdn.test");
/// assert!(storage.calls().is_empty());
/// ```
#[derive(Debug)]
pub struct ScriptedStorage {
    outcome: Mutex<Outcome>,
    calls: Mutex<Vec<StorageCall>>,
}

impl ScriptedStorage {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `<base>/<namespace>/<n>` for the n-th call
    #[must_use]
    pub fn succeeding(base: &str) -> Self {
        Self::with_outcome(Outcome::Succeed {
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Answer every call with `err`
    #[must_use]
    pub fn failing(err: ProviderError) -> Self {
        Self::with_outcome(Outcome::Fail(err))
    }

    /// Never answer
    #[must_use]
    pub fn stalled() -> Self {
        Self::with_outcome(Outcome::Stall)
    }

    /// Calls received so far
    #[must_use]
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RemoteStorage for ScriptedStorage {
    async fn upload(&self, bytes: Bytes, namespace: &str) -> Result<Locator, ProviderError> {
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(StorageCall {
                bytes,
                namespace: namespace.to_string(),
            });
            calls.len()
        };

        let outcome = self.outcome.lock().clone();
        match outcome {
            Outcome::Succeed { base } => {
                Ok(Locator::new(format!("{base}/{namespace}/{call_number}")))
            }
            Outcome::Fail(err) => Err(err),
            Outcome::Stall => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_and_numbers_locators() {
        let storage = ScriptedStorage::succeeding("https://cdn.test/");

        let first = storage.upload(Bytes::from_static(b"a"), "ns").await.unwrap();
        let second = storage.upload(Bytes::from_static(b"b"), "ns").await.unwrap();

        assert_eq!(first.as_str(), "https://cdn.test/ns/1");
        assert_eq!(second.as_str(), "https://cdn.test/ns/2");
        assert_eq!(storage.calls()[1].bytes, Bytes::from_static(b"b"));
    }

    #[tokio::test]
    async fn test_failing_still_records_call() {
        let storage = ScriptedStorage::failing(ProviderError::Transport("reset".to_string()));

        let err = storage.upload(Bytes::new(), "ns").await.unwrap_err();
        assert_eq!(err, ProviderError::Transport("reset".to_string()));
        assert_eq!(storage.calls().len(), 1);
    }
}
