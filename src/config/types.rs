use serde::Deserialize;

use crate::config::selectors::{default_selectors, SelectorConfig};
use crate::config::settings::SettingsConfig;
use crate::config::upstream::UpstreamConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default = "default_selectors")]
    pub selectors: Vec<SelectorConfig>,
}
