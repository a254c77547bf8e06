use serde::Deserialize;

use crate::utils::constants::{
    SELECTOR_DOMAIN_USERID, SELECTOR_USER_ID, SERVICE_BATCH_ATTRIBUTES, SERVICE_ECOM_ATTRIBUTES,
};

/// ================================
/// Identity selectors
/// ================================
/// Maps an inbound query parameter to the upstream attribute service it is
/// looked up in. Order matters: results are merged in list order and later
/// selectors win on key collision.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    /// query parameter name, also used as the upstream attribute key
    pub param: String,
    /// upstream service namespace
    pub service: String,
}

impl SelectorConfig {
    pub fn new(param: &str, service: &str) -> Self {
        Self {
            param: param.to_owned(),
            service: service.to_owned(),
        }
    }
}

pub fn default_selectors() -> Vec<SelectorConfig> {
    vec![
        SelectorConfig::new(SELECTOR_USER_ID, SERVICE_BATCH_ATTRIBUTES),
        SelectorConfig::new(SELECTOR_DOMAIN_USERID, SERVICE_ECOM_ATTRIBUTES),
    ]
}
