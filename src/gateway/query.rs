use std::collections::HashMap;

use crate::config::selectors::SelectorConfig;

/// One upstream lookup: an identity dimension, the service it lives in, and
/// the identifiers to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorLookup {
    pub selector: String,
    pub service: String,
    pub identifiers: Vec<String>,
}

/// Ordered set of lookups built from one inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeQuery {
    pub lookups: Vec<SelectorLookup>,
}

impl AttributeQuery {
    /// Keeps configuration order. Absent or empty parameters are skipped.
    pub fn from_params(selectors: &[SelectorConfig], params: &HashMap<String, String>) -> Self {
        let lookups = selectors
            .iter()
            .filter_map(|selector| {
                params
                    .get(&selector.param)
                    .filter(|value| !value.is_empty())
                    .map(|value| SelectorLookup {
                        selector: selector.param.clone(),
                        service: selector.service.clone(),
                        identifiers: vec![value.clone()],
                    })
            })
            .collect();
        Self { lookups }
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }
}
