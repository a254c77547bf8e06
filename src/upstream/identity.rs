use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::config::upstream::ApiCredentials;
use crate::error::ProxyError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

static IDENTITY_MSG: &str = "identity";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    access_token: String,
}

pub fn token_url(identity_url: &str, org_id: &str) -> String {
    format!(
        "{}/api/msc/v1/organizations/{}/credentials/v3/token",
        identity_url.trim_end_matches('/'),
        org_id
    )
}

/// Exchanges the static API key pair for a bearer token. No retry.
pub async fn fetch_access_token(
    client: &Client,
    identity_url: &str,
    credentials: &ApiCredentials,
) -> Result<String, ProxyError> {
    let metrics = get_metrics().await;
    let start = get_instant();
    metrics
        .upstream_requests
        .with_label_values(&[IDENTITY_MSG])
        .inc();

    let result = request_token(client, identity_url, credentials).await;

    metrics
        .upstream_duration
        .with_label_values(&[IDENTITY_MSG])
        .observe(start.elapsed().as_secs_f64());
    if let Err(e) = &result {
        metrics
            .upstream_failures
            .with_label_values(&[IDENTITY_MSG, status_label(e)])
            .inc();
    }
    result
}

async fn request_token(
    client: &Client,
    identity_url: &str,
    credentials: &ApiCredentials,
) -> Result<String, ProxyError> {
    let response = client
        .get(token_url(identity_url, &credentials.org_id))
        .header("X-API-Key-Id", &credentials.api_key_id)
        .header("X-API-Key", &credentials.api_key)
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| ProxyError::UpstreamAuth {
            status: None,
            message: format!("identity request failed: {}", e),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("auth API error ({}): {}", status.as_u16(), body);
        return Err(ProxyError::UpstreamAuth {
            status: Some(status.as_u16()),
            message: format!("identity endpoint returned {}: {}", status, body),
        });
    }

    let auth: AuthResponse = response.json().await.map_err(|e| ProxyError::UpstreamAuth {
        status: Some(status.as_u16()),
        message: format!("invalid identity response: {}", e),
    })?;
    if auth.access_token.is_empty() {
        return Err(ProxyError::UpstreamAuth {
            status: Some(status.as_u16()),
            message: "identity response carried an empty accessToken".to_string(),
        });
    }
    Ok(auth.access_token)
}

fn status_label(e: &ProxyError) -> &'static str {
    match e {
        ProxyError::UpstreamAuth { status: None, .. } => "transport",
        _ => "status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_embeds_org() {
        assert_eq!(
            token_url("https://console.example.com/", "org-42"),
            "https://console.example.com/api/msc/v1/organizations/org-42/credentials/v3/token"
        );
    }
}
