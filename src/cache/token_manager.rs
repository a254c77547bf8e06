use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, error, info};

use crate::cache::credential::{CacheStatus, Credential, RefreshPolicy};
use crate::cache::store::KvStore;
use crate::config::upstream::UpstreamConfig;
use crate::error::ProxyError;
use crate::helpers::time::now_ms;
use crate::observability::metrics::get_metrics;
use crate::upstream::identity;

/// Owns the single cached bearer credential.
///
/// The check-fetch-write sequence is not locked. Requests that observe an
/// expired credential at the same time each fetch their own token and the
/// store keeps whichever write lands last; every one of those tokens is valid.
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn KvStore>,
    client: Client,
    upstream: UpstreamConfig,
    policy: RefreshPolicy,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn KvStore>,
        client: Client,
        upstream: UpstreamConfig,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            store,
            client,
            upstream,
            policy,
        }
    }

    /// Returns the cached token while it is fresh, otherwise fetches a new
    /// one from the identity endpoint and writes it back.
    pub async fn get_token(&self) -> Result<String, ProxyError> {
        let credentials = self.upstream.credentials()?;
        let metrics = get_metrics().await;

        if let Some(cached) = Credential::load(self.store.as_ref()).await? {
            if cached.is_fresh(now_ms(), &self.policy) {
                debug!("using cached auth token");
                metrics.token_cache_hits.inc();
                return Ok(cached.value);
            }
            debug!("cached auth token expires at {}, refreshing", cached.expires_at_ms);
        }

        info!("fetching new auth token for org: {}", credentials.org_id);
        let access_token =
            identity::fetch_access_token(&self.client, &self.upstream.identity_url, &credentials)
                .await
                .inspect_err(|e| {
                    error!("error getting auth token: {}", e);
                    metrics.token_refresh_failures.inc();
                })?;

        let credential = Credential::issued(access_token, now_ms(), &self.policy);
        credential.save(self.store.as_ref()).await?;
        metrics.token_refreshes.inc();
        metrics.token_expiry_unix_ms.set(credential.expires_at_ms);
        info!("auth token cached until {}", credential.expires_at_ms);

        Ok(credential.value)
    }

    /// Snapshot of the cache without touching the network.
    pub async fn status(&self) -> Result<CacheStatus, ProxyError> {
        let cached = Credential::load(self.store.as_ref()).await?;
        Ok(Credential::status(cached.as_ref(), now_ms(), &self.policy))
    }
}
