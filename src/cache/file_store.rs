use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::store::{KvStore, StoreError, StoreFuture};

/// JSON-file backed store. The whole map is loaded on open and rewritten
/// (temp file + rename) after every put, so the cached credential survives
/// a restart.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
                message: format!("failed to create {}: {e}", parent.display()),
            })?;
        }
        let snapshot = Self::load_snapshot(&path)?;
        Ok(Self {
            path,
            inner: Arc::new(RwLock::new(snapshot)),
        })
    }

    fn load_snapshot(path: &Path) -> Result<HashMap<String, String>, StoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(StoreError::Backend {
                    message: format!("failed to read {}: {e}", path.display()),
                })
            }
        };
        if bytes.is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
            message: format!("failed to parse {}: {e}", path.display()),
        })
    }

    async fn persist(&self, snapshot: &HashMap<String, String>) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("failed to write {}: {e}", tmp.display()),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("failed to replace {}: {e}", self.path.display()),
            })?;
        debug!("cache persisted to {}", self.path.display());
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { Ok::<_, StoreError>(self.inner.read().await.get(key).cloned()) })
    }

    fn put<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            // held across the write so snapshots land in order
            let mut guard = self.inner.write().await;
            guard.insert(key.to_owned(), value);
            self.persist(&guard).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("cache.json");

        let store = FileStore::open(&path)?;
        store.put("auth_token", "abc".into()).await?;
        store.put("auth_token_expiry", "42".into()).await?;

        let reopened = FileStore::open(&path)?;
        assert_eq!(reopened.get("auth_token").await?.as_deref(), Some("abc"));
        assert_eq!(reopened.get("auth_token_expiry").await?.as_deref(), Some("42"));
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"not json")?;

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Serialization { .. })
        ));
        Ok(())
    }
}
