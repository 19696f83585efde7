//! Remote object storage
//!
//! Uploaded images never live in this service: they are validated by
//! content and then handed to a [`RemoteStorage`] provider, which returns the
//! [`Locator`] that gets recorded.

pub mod cloudinary;
pub mod local;
pub mod provider;
pub mod sniff;

pub use cloudinary::{CloudinaryStorage, SignatureAlgorithm};
pub use local::LocalStorage;
pub use provider::{Locator, ProviderError, RemoteStorage};
pub use sniff::{sniff, ImageKind, Unsupported, SNIFF_LEN};

#[cfg(test)]
pub use provider::MockRemoteStorage;

use crate::config::{StorageBackend, StorageSettings};
use std::sync::Arc;

/// Build the provider selected by `settings.backend`
///
/// # Errors
///
/// Returns [`ProviderError::Config`] for missing or unusable credentials,
/// so misconfiguration fails at startup rather than per request.
pub fn from_settings(settings: &StorageSettings) -> Result<Arc<dyn RemoteStorage>, ProviderError> {
    match settings.backend {
        StorageBackend::Cloudinary => Ok(Arc::new(CloudinaryStorage::new(
            &settings.cloudinary_url,
            settings.api_base.as_str(),
            settings.signature_algorithm,
        )?)),
        StorageBackend::Local => Ok(Arc::new(LocalStorage::new(
            settings.local_root.clone(),
            &settings.local_public_base,
        )?)),
    }
}
