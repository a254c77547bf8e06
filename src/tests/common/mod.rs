// tests/common/mod.rs
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use httpmock::MockServer;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::cache::memory_store::MemoryStore;
use crate::config::proc_loader::parse_config;
use crate::gateway::attributes::AttributeGateway;
use crate::server::server::{router, AppState};
use crate::ServiceConfig;

pub const API_KEY: &str = "test-api-key";
pub const API_KEY_ID: &str = "test-api-key-id";
pub const ORG_ID: &str = "org-test";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn token_path() -> String {
    format!("/api/msc/v1/organizations/{}/credentials/v3/token", ORG_ID)
}

/// Config pointing both upstream endpoints at the mock server.
/// `upstream_block` replaces the whole `upstream:` section when given.
pub async fn test_config(upstream: &MockServer, upstream_block: Option<String>) -> ServiceConfig {
    let block = upstream_block.unwrap_or_else(|| {
        format!(
            r#"
upstream:
  api_key: {API_KEY}
  api_key_id: {API_KEY_ID}
  org_id: {ORG_ID}
  signals_api_url: {base}
  identity_url: {base}
"#,
            base = upstream.base_url()
        )
    });
    let content = format!(
        r#"
settings:
  server:
    host: 127.0.0.1
    port: "0"
  environment: test
  metrics:
    is_enabled: true
{block}
"#
    );
    parse_config(content).await.expect("test config")
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub handle: JoinHandle<()>,
    pub store: MemoryStore,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn(config: ServiceConfig) -> Self {
        let store = MemoryStore::new();
        let gateway =
            AttributeGateway::new(&config, Arc::new(store.clone())).expect("gateway");
        let state = AppState::new(gateway, &config.settings.environment).await;
        let (handle, addr) = spawn_axum(router(state, &config.settings)).await;
        Self {
            addr,
            handle,
            store,
            client: build_reqwest_client(),
        }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
