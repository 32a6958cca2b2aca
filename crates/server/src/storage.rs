//! Object storage for uploaded images.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where uploads end up. Keys are relative, `/`-separated paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// URL under which the stored object is publicly reachable.
    fn public_url(&self, key: &str) -> String;
}

/// Stores objects as files below a root directory.
///
/// The server mounts the same directory under `/uploads`, so
/// `public_base_url` is normally `https://<host>/uploads`.
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDirStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalDirStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key, content_type, size = bytes.len(), "object stored");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_cannot_escape_root() {
        let store = LocalDirStore::new("/srv/uploads", "http://localhost/uploads/");
        assert!(store.path_for("images/a.png").is_ok());
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("/etc/passwd").is_err());
        assert!(store.path_for("").is_err());
    }

    #[test]
    fn public_url_joins_base_and_key() {
        let store = LocalDirStore::new("/srv/uploads", "http://localhost/uploads/");
        assert_eq!(
            store.public_url("images/a.png"),
            "http://localhost/uploads/images/a.png"
        );
    }

    #[tokio::test]
    async fn put_writes_below_root() {
        let root = std::env::temp_dir().join(format!("boutique-store-{}", uuid::Uuid::new_v4()));
        let store = LocalDirStore::new(&root, "http://localhost/uploads");
        store
            .put("images/x.gif", b"GIF89a", "image/gif")
            .await
            .unwrap();
        let written = std::fs::read(root.join("images/x.gif")).unwrap();
        assert_eq!(written, b"GIF89a");
        std::fs::remove_dir_all(root).unwrap();
    }
}
