use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::cache::file_store::FileStore;
use crate::cache::memory_store::MemoryStore;
use crate::config::settings::{CacheBackend, CacheConfig};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// String key-value store holding the cached credential.
///
/// No compare-and-swap: concurrent writers simply overwrite each other.
pub trait KvStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    fn put<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("cache serialization error: {message}")]
    Serialization { message: String },
    #[error("cache backend failure: {message}")]
    Backend { message: String },
}

/// Builds the backend selected in `settings.cache`.
pub fn build_store(cfg: &CacheConfig) -> Result<Arc<dyn KvStore>, StoreError> {
    match cfg.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        CacheBackend::File => {
            let path = cfg.path.as_deref().ok_or_else(|| StoreError::Backend {
                message: "file backend requires settings.cache.path".to_string(),
            })?;
            Ok(Arc::new(FileStore::open(path)?))
        }
    }
}
