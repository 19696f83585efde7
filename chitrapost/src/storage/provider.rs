//! Remote storage provider abstraction

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use thiserror::Error;

/// Publicly reachable reference to a stored object
///
/// Opaque to this crate; whatever the provider returns is recorded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Locator(String);

impl Locator {
    /// Wrap a provider-issued reference
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Get the locator as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider failures
///
/// None of these leave a durable record behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Provider answered with a non-success status
    #[error("Provider rejected upload ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Provider's message
        message: String,
    },

    /// Connection, TLS or I/O failure
    #[error("Provider transport error: {0}")]
    Transport(String),

    /// Success status with a body we could not use
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// The hand-off did not finish within its deadline
    #[error("Provider hand-off timed out")]
    TimedOut,

    /// The hand-off task panicked or was cancelled
    #[error("Provider hand-off task failed: {0}")]
    TaskFailed(String),

    /// Misconfigured credentials or endpoint
    #[error("Provider configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Map a `reqwest` error onto [`ProviderError`]
    #[must_use]
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimedOut
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Rejected {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::classify(&err)
    }
}

/// Durable object storage outside this process
///
/// `namespace` groups objects (a folder or key prefix); the returned
/// [`Locator`] must be fetchable once the call returns `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Store `bytes` under `namespace`
    ///
    /// # Errors
    ///
    /// Any [`ProviderError`]; on error nothing is considered stored.
    async fn upload(&self, bytes: Bytes, namespace: &str) -> Result<Locator, ProviderError>;
}
