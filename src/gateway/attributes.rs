use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cache::credential::RefreshPolicy;
use crate::cache::store::KvStore;
use crate::cache::token_manager::TokenManager;
use crate::config::selectors::SelectorConfig;
use crate::config::types::ServiceConfig;
use crate::config::upstream::UpstreamConfig;
use crate::error::ProxyError;
use crate::gateway::query::AttributeQuery;
use crate::upstream::signals::{fetch_attributes, AttributeRequest};

/// Resolves attribute lookups against the signals platform.
#[derive(Clone)]
pub struct AttributeGateway {
    upstream: UpstreamConfig,
    selectors: Arc<Vec<SelectorConfig>>,
    tokens: TokenManager,
    client: Client,
}

impl AttributeGateway {
    pub fn new(config: &ServiceConfig, store: Arc<dyn KvStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.settings.upstream_timeout_ms))
            .build()
            .map_err(|e| anyhow!("cannot build http client: {}", e))?;

        let tokens = TokenManager::new(
            store,
            client.clone(),
            config.upstream.clone(),
            RefreshPolicy::from(&config.settings.token),
        );

        Ok(Self {
            upstream: config.upstream.clone(),
            selectors: Arc::new(config.selectors.clone()),
            tokens,
            client,
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// validated -> token-acquired -> fetched(0..N) -> merged.
    ///
    /// The first failing step aborts the whole lookup; nothing is merged
    /// partially.
    pub async fn resolve(&self, params: &HashMap<String, String>) -> Result<Map<String, Value>, ProxyError> {
        let upstream = self.upstream.resolve()?;
        let query = AttributeQuery::from_params(&self.selectors, params);

        let token = self.tokens.get_token().await?;

        let mut merged = Map::new();
        for lookup in &query.lookups {
            let request =
                AttributeRequest::new(&lookup.service, &lookup.selector, &lookup.identifiers);
            let attributes =
                fetch_attributes(&self.client, &upstream.signals_api_url, &token, &request).await?;
            debug!(
                "service '{}' returned {} attributes",
                lookup.service,
                attributes.len()
            );
            // later selectors win on key collision
            merged.extend(attributes);
        }

        info!(
            "resolved {} attributes from {} lookups",
            merged.len(),
            query.lookups.len()
        );
        Ok(merged)
    }
}
