use std::collections::HashMap;

use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::ProxyError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::ATTRIBUTES_PATH;

static ATTRIBUTES_MSG: &str = "attributes";

/// Body of one batch-attribute call: a single service and one identity
/// dimension with its identifiers.
#[derive(Debug, Serialize, PartialEq)]
pub struct AttributeRequest<'a> {
    pub service: &'a str,
    pub attribute_keys: HashMap<&'a str, &'a [String]>,
}

impl<'a> AttributeRequest<'a> {
    pub fn new(service: &'a str, selector: &'a str, identifiers: &'a [String]) -> Self {
        Self {
            service,
            attribute_keys: HashMap::from([(selector, identifiers)]),
        }
    }
}

/// Posts one lookup and returns the attribute map untouched; list-wrapped
/// values stay lists.
pub async fn fetch_attributes(
    client: &Client,
    signals_api_url: &str,
    token: &str,
    request: &AttributeRequest<'_>,
) -> Result<Map<String, Value>, ProxyError> {
    let metrics = get_metrics().await;
    let start = get_instant();
    metrics
        .upstream_requests
        .with_label_values(&[ATTRIBUTES_MSG])
        .inc();

    let result = post_lookup(client, signals_api_url, token, request).await;

    metrics
        .upstream_duration
        .with_label_values(&[ATTRIBUTES_MSG])
        .observe(start.elapsed().as_secs_f64());
    if let Err(e) = &result {
        metrics
            .upstream_failures
            .with_label_values(&[ATTRIBUTES_MSG, e.reason()])
            .inc();
    }
    result
}

async fn post_lookup(
    client: &Client,
    signals_api_url: &str,
    token: &str,
    request: &AttributeRequest<'_>,
) -> Result<Map<String, Value>, ProxyError> {
    let url = format!("{}{}", signals_api_url.trim_end_matches('/'), ATTRIBUTES_PATH);
    debug!("attribute lookup, service: {}", request.service);

    let transport = |e: reqwest::Error| ProxyError::AttributeTransport {
        service: request.service.to_owned(),
        message: e.to_string(),
    };

    let response = client
        .post(url)
        .bearer_auth(token)
        .json(request)
        .send()
        .await
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("signals API error ({}): {}", status.as_u16(), body);
        return Err(ProxyError::AttributeFetch {
            service: request.service.to_owned(),
            status: status.as_u16(),
            body,
        });
    }

    match response.json::<Value>().await.map_err(transport)? {
        Value::Object(map) => Ok(map),
        other => Err(ProxyError::AttributeTransport {
            service: request.service.to_owned(),
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
