//! Local filesystem provider for development

use super::provider::{Locator, ProviderError, RemoteStorage};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;
use uuid::Uuid;

/// Stores objects under a local directory
///
/// # Directory Structure
///
/// ```text
/// ./media/
/// └── chitrapost/
///     ├── 550e8400-e29b-41d4-a716-446655440000
///     └── a3bb189e-8bf9-4a9a-b5c7-9f9c3b8e5d7a
/// ```
///
/// The locator is `<public_base>/<namespace>/<uuid>`; serving that path is
/// left to whatever fronts the directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    /// Create a provider rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if `root` exists and is not a
    /// directory.
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Result<Self, ProviderError> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(ProviderError::Config(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        Ok(Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &str) -> Result<PathBuf, ProviderError> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ProviderError::Config(format!("invalid namespace {namespace:?}")));
        }
        Ok(self.root.join(namespace))
    }
}

fn io_error(err: &std::io::Error) -> ProviderError {
    ProviderError::Transport(err.to_string())
}

/// Write `bytes` through `out`; on failure remove the partial object at `path`
async fn write_or_discard<W>(path: &Path, mut out: W, bytes: &[u8]) -> Result<(), ProviderError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        out.write_all(bytes).await?;
        out.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(out);
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %cleanup, "failed to remove partial object");
        }
        return Err(io_error(&e));
    }
    Ok(())
}

#[async_trait]
impl RemoteStorage for LocalStorage {
    async fn upload(&self, bytes: Bytes, namespace: &str) -> Result<Locator, ProviderError> {
        let dir = self.namespace_dir(namespace)?;
        fs::create_dir_all(&dir).await.map_err(|e| io_error(&e))?;

        let id = Uuid::new_v4().to_string();
        let path = dir.join(&id);
        let file = fs::File::create(&path).await.map_err(|e| io_error(&e))?;
        write_or_discard(&path, file, &bytes).await?;

        Ok(Locator::new(format!("{}/{namespace}/{id}", self.public_base)))
    }
}
