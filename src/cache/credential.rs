use serde::Serialize;

use crate::cache::store::{KvStore, StoreError};
use crate::config::settings::TokenConfig;
use crate::helpers::time::ms_to_rfc3339;
use crate::utils::constants::{AUTH_TOKEN_EXPIRY_KEY, AUTH_TOKEN_KEY};

const PREVIEW_CHARS: usize = 10;

/// Bearer token plus its expiry, epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub value: String,
    pub expires_at_ms: i64,
}

/// When a cached credential stops being served and how long a fresh one lives.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub skew_ms: i64,
    pub lifetime_ms: i64,
}

impl From<&TokenConfig> for RefreshPolicy {
    fn from(cfg: &TokenConfig) -> Self {
        Self {
            skew_ms: secs_to_ms(cfg.refresh_skew_seconds),
            lifetime_ms: secs_to_ms(cfg.lifetime_seconds),
        }
    }
}

/// Saturates at `i64::MAX` instead of wrapping.
fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .unwrap_or(i64::MAX)
}

/// Debug view of the cached credential served on the cache-status route.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub has_token: bool,
    pub token_preview: Option<String>,
    pub expiry_time: Option<String>,
    pub is_valid: bool,
}

impl Credential {
    pub fn issued(value: String, now_ms: i64, policy: &RefreshPolicy) -> Self {
        Self {
            value,
            expires_at_ms: now_ms.saturating_add(policy.lifetime_ms),
        }
    }

    /// Valid only while `now < expiry - skew`.
    pub fn is_fresh(&self, now_ms: i64, policy: &RefreshPolicy) -> bool {
        now_ms < self.expires_at_ms.saturating_sub(policy.skew_ms)
    }

    pub fn preview(&self) -> String {
        let head: String = self.value.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }

    /// Reads both cache entries. A missing or unparsable entry reads as no
    /// credential at all, which forces a refresh.
    pub async fn load(store: &dyn KvStore) -> Result<Option<Self>, StoreError> {
        let value = store.get(AUTH_TOKEN_KEY).await?;
        let expiry = store.get(AUTH_TOKEN_EXPIRY_KEY).await?;

        Ok(match (value, expiry) {
            (Some(value), Some(expiry)) if !value.is_empty() => expiry
                .trim()
                .parse::<i64>()
                .ok()
                .map(|expires_at_ms| Self {
                    value,
                    expires_at_ms,
                }),
            _ => None,
        })
    }

    pub async fn save(&self, store: &dyn KvStore) -> Result<(), StoreError> {
        store.put(AUTH_TOKEN_KEY, self.value.clone()).await?;
        store
            .put(AUTH_TOKEN_EXPIRY_KEY, self.expires_at_ms.to_string())
            .await
    }

    pub fn status(cached: Option<&Self>, now_ms: i64, policy: &RefreshPolicy) -> CacheStatus {
        match cached {
            Some(credential) => CacheStatus {
                has_token: true,
                token_preview: Some(credential.preview()),
                expiry_time: ms_to_rfc3339(credential.expires_at_ms),
                is_valid: credential.is_fresh(now_ms, policy),
            },
            None => CacheStatus {
                has_token: false,
                token_preview: None,
                expiry_time: None,
                is_valid: false,
            },
        }
    }
}
