use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::error::ProxyError;
use crate::helpers::time::now_rfc3339;
use crate::server::server::AppState;

/// `GET /attributes?user_id=..&domain_userid=..`
pub async fn attributes(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match state.gateway.resolve(&params).await {
        Ok(attributes) => Json(attributes).into_response(),
        Err(e) => {
            error!("attribute lookup failed: {}", e);
            e.into_response()
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "timestamp": now_rfc3339(),
        "environment": state.environment.as_str(),
    }))
    .into_response()
}

pub async fn cache_status(State(state): State<AppState>) -> Response {
    match state.gateway.tokens().status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            error!("cache status failed: {}", e);
            e.into_response()
        }
    }
}

pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

pub async fn not_found(uri: axum::http::Uri) -> ProxyError {
    warn!("no route for {}", uri.path());
    ProxyError::NotFound
}
