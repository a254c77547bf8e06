//! # Attribute Proxy Library
//!
//! Caches a bearer token obtained from the signals platform identity endpoint
//! and forwards personalization attribute lookups on behalf of storefront clients.
//!
//! Modules:
//! - `config` — service configuration, loading and validation
//! - `cache` — key-value store backends and the token cache manager
//! - `upstream` — identity and attribute endpoint clients
//! - `gateway` — selector extraction and attribute merging
//! - `server` — axum router, CORS envelope and handlers

pub mod config;
pub mod cache;
pub mod error;
pub mod gateway;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod upstream;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::config::types::ServiceConfig;
pub use crate::error::ProxyError;
