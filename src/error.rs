use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::cache::store::StoreError;
use crate::utils::constants::AVAILABLE_ENDPOINTS;

/// Failures on the request path. Every variant is rendered as a JSON
/// `{ error, message? }` body; CORS headers are attached by the server layer.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("API credentials not configured (missing {})", .missing.join(", "))]
    Config { missing: Vec<&'static str> },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    NotFound,

    #[error("Failed to obtain auth token: {message}")]
    UpstreamAuth {
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to fetch attributes for service '{service}': upstream returned {status}: {body}")]
    AttributeFetch {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Attribute request for service '{service}' failed: {message}")]
    AttributeTransport { service: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::Config { .. }
            | ProxyError::UpstreamAuth { .. }
            | ProxyError::AttributeFetch { .. }
            | ProxyError::AttributeTransport { .. }
            | ProxyError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the `reason` metric dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            ProxyError::Config { .. } => "config",
            ProxyError::MethodNotAllowed => "method_not_allowed",
            ProxyError::NotFound => "not_found",
            ProxyError::UpstreamAuth { .. } => "upstream_auth",
            ProxyError::AttributeFetch { .. } => "attribute_status",
            ProxyError::AttributeTransport { .. } => "attribute_transport",
            ProxyError::Store(_) => "store",
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ProxyError::Config { .. } | ProxyError::MethodNotAllowed => {
                json!({ "error": self.to_string() })
            }
            ProxyError::NotFound => json!({
                "error": self.to_string(),
                "availableEndpoints": AVAILABLE_ENDPOINTS,
            }),
            _ => json!({
                "error": "Internal server error",
                "message": self.to_string(),
            }),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
