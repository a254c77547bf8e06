use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::routing::get;
use axum::{middleware, Router};
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::gateway::attributes::AttributeGateway;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;
use crate::server::cors::cors_envelope;
use crate::server::handlers;
use crate::utils::constants::{
    ATTRIBUTES_ROUTE, CACHE_STATUS_ALIAS_ROUTE, CACHE_STATUS_ROUTE, HEALTH_ROUTE,
};

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub gateway: AttributeGateway,
    pub environment: Arc<String>,
}

impl AppState {
    pub async fn new(gateway: AttributeGateway, environment: &str) -> Self {
        let metrics = get_metrics().await;
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            gateway,
            environment: Arc::new(environment.to_owned()),
        }
    }
}

/// All routes plus the CORS envelope; unknown paths fall through to 404.
pub fn router(state: AppState, settings: &SettingsConfig) -> Router {
    Router::new()
        .route(
            ATTRIBUTES_ROUTE,
            get(handlers::attributes)
                .head(handlers::method_not_allowed)
                .fallback(handlers::method_not_allowed),
        )
        .route(HEALTH_ROUTE, get(handlers::health))
        .route(CACHE_STATUS_ROUTE, get(handlers::cache_status))
        .route(CACHE_STATUS_ALIAS_ROUTE, get(handlers::cache_status))
        .merge(state.metrics_state.router(&settings.metrics))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(cors_envelope))
        .with_state(state)
}

/// Bind and serve until ctrl-c / SIGTERM.
pub async fn start(settings: &SettingsConfig, state: AppState) -> Result<()> {
    let app = router(state, settings);

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("cannot bind {}: {}", bind_addr, e))?;
    info!("listening on {}", bind_addr);

    let metrics = get_metrics().await;
    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
