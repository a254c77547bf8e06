//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates server, logging, cache and token invariants
//! - Validates the selector table (non-empty names, unique params)
//!
//! Upstream secrets are deliberately not checked here: a deployment without
//! them still starts and answers every attribute request with a 500.

use std::collections::HashSet;
use tracing::{error, info};

use crate::config::selectors::SelectorConfig;
use crate::config::settings::{CacheBackend, SettingsConfig};
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_TOKEN_SECONDS: u64 = 60 * 60 * 24 * 365;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_selectors(&cfg.selectors, &mut errors);

    if cfg.upstream.identity_url.trim().is_empty() {
        errors.push("upstream.identity_url must not be empty".to_string());
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be a valid port number",
            settings.server.port
        ));
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }

    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }

    if settings.cache.backend == CacheBackend::File
        && settings
            .cache
            .path
            .as_deref()
            .map_or(true, |p| p.trim().is_empty())
    {
        errors.push("settings.cache.path is required for the file backend".to_string());
    }

    let token = &settings.token;
    if token.lifetime_seconds > MAX_TOKEN_SECONDS {
        errors.push(format!(
            "settings.token.lifetime_seconds ({}) is unreasonably large",
            token.lifetime_seconds
        ));
    }
    if token.refresh_skew_seconds > MAX_TOKEN_SECONDS {
        errors.push(format!(
            "settings.token.refresh_skew_seconds ({}) is unreasonably large",
            token.refresh_skew_seconds
        ));
    }
    if token.lifetime_seconds <= token.refresh_skew_seconds {
        errors.push(format!(
            "settings.token.lifetime_seconds ({}) must be greater than refresh_skew_seconds ({})",
            token.lifetime_seconds, token.refresh_skew_seconds
        ));
    }

    if settings.upstream_timeout_ms == 0 {
        errors.push("settings.upstream_timeout_ms must be > 0".to_string());
    }
}

/// SELECTOR VALIDATION
fn validate_selectors(selectors: &[SelectorConfig], errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (idx, selector) in selectors.iter().enumerate() {
        if selector.param.is_empty() {
            errors.push(format!("selectors[{}].param must not be empty", idx));
        }
        if selector.service.is_empty() {
            errors.push(format!("selectors[{}].service must not be empty", idx));
        }
        if !selector.param.is_empty() && !seen.insert(selector.param.as_str()) {
            errors.push(format!(
                "selectors[{}].param '{}' is declared more than once",
                idx, selector.param
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::selectors::default_selectors;

    #[tokio::test]
    async fn oversized_token_settings_are_rejected() {
        let content = r#"
settings:
  server: { host: 127.0.0.1, port: "8787" }
  token:
    refresh_skew_seconds: 18446744073709551615
    lifetime_seconds: 18446744073709551615
"#;
        let cfg: ServiceConfig = serde_yaml::from_str(content).unwrap();
        let errors = validate_service_config(&cfg).await.unwrap_err();
        assert!(errors.iter().any(|e| e.contains("lifetime_seconds") && e.contains("unreasonably large")));
        assert!(errors.iter().any(|e| e.contains("refresh_skew_seconds") && e.contains("unreasonably large")));
    }

    #[test]
    fn default_selectors_are_valid() {
        let mut errors = Vec::new();
        validate_selectors(&default_selectors(), &mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn duplicate_and_blank_selectors_are_reported() {
        let selectors = vec![
            SelectorConfig::new("user_id", "batch_attributes"),
            SelectorConfig::new("user_id", "ecom_attributes"),
            SelectorConfig::new("", ""),
        ];
        let mut errors = Vec::new();
        validate_selectors(&selectors, &mut errors);
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors[0].contains("declared more than once"));
    }
}
