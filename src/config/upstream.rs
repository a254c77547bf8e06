use serde::Deserialize;

use crate::error::ProxyError;
use crate::utils::constants::DEFAULT_IDENTITY_URL;

/// ================================
/// Signals platform access
/// ================================
/// Values normally come from `${VAR}` placeholders; an empty string after
/// expansion is treated the same as an absent value.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub api_key_id: Option<String>,
    pub org_id: Option<String>,
    pub signals_api_url: Option<String>,
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_id: None,
            org_id: None,
            signals_api_url: None,
            identity_url: default_identity_url(),
        }
    }
}

/// Static key pair used against the identity endpoint.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_key_id: String,
    pub org_id: String,
}

/// Everything an attribute lookup needs, all present and non-empty.
#[derive(Debug, Clone)]
pub struct ResolvedUpstream {
    pub credentials: ApiCredentials,
    pub signals_api_url: String,
}

impl UpstreamConfig {
    /// Credentials for the token endpoint only.
    pub fn credentials(&self) -> Result<ApiCredentials, ProxyError> {
        let mut missing = Vec::new();
        let api_key = required(&self.api_key, "API_KEY", &mut missing);
        let api_key_id = required(&self.api_key_id, "API_KEY_ID", &mut missing);
        let org_id = required(&self.org_id, "ORG_ID", &mut missing);

        match (api_key, api_key_id, org_id) {
            (Some(api_key), Some(api_key_id), Some(org_id)) => Ok(ApiCredentials {
                api_key,
                api_key_id,
                org_id,
            }),
            _ => Err(ProxyError::Config { missing }),
        }
    }

    /// Checks all four required values at once so the error names every gap.
    pub fn resolve(&self) -> Result<ResolvedUpstream, ProxyError> {
        let mut missing = Vec::new();
        let api_key = required(&self.api_key, "API_KEY", &mut missing);
        let api_key_id = required(&self.api_key_id, "API_KEY_ID", &mut missing);
        let org_id = required(&self.org_id, "ORG_ID", &mut missing);
        let signals_api_url = required(&self.signals_api_url, "SIGNALS_API_URL", &mut missing);

        match (api_key, api_key_id, org_id, signals_api_url) {
            (Some(api_key), Some(api_key_id), Some(org_id), Some(signals_api_url)) => {
                Ok(ResolvedUpstream {
                    credentials: ApiCredentials {
                        api_key,
                        api_key_id,
                        org_id,
                    },
                    signals_api_url: signals_api_url.trim_end_matches('/').to_string(),
                })
            }
            _ => Err(ProxyError::Config { missing }),
        }
    }
}

fn required(
    value: &Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            missing.push(name);
            None
        }
    }
}

fn default_identity_url() -> String {
    DEFAULT_IDENTITY_URL.to_string()
}
