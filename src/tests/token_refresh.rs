#[cfg(test)]
mod test {
    use std::sync::Arc;

    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    use crate::cache::credential::{Credential, RefreshPolicy};
    use crate::cache::memory_store::MemoryStore;
    use crate::cache::token_manager::TokenManager;
    use crate::config::upstream::UpstreamConfig;
    use crate::error::ProxyError;
    use crate::helpers::time::now_ms;
    use crate::tests::common::{build_reqwest_client, token_path, API_KEY, API_KEY_ID, ORG_ID};

    const POLICY: RefreshPolicy = RefreshPolicy {
        skew_ms: 5 * 60 * 1000,
        lifetime_ms: 60 * 60 * 1000,
    };

    fn upstream(server: &MockServer) -> UpstreamConfig {
        UpstreamConfig {
            api_key: Some(API_KEY.into()),
            api_key_id: Some(API_KEY_ID.into()),
            org_id: Some(ORG_ID.into()),
            signals_api_url: Some(server.base_url()),
            identity_url: server.base_url(),
        }
    }

    fn manager(store: &MemoryStore, upstream: UpstreamConfig) -> TokenManager {
        TokenManager::new(
            Arc::new(store.clone()),
            build_reqwest_client(),
            upstream,
            POLICY,
        )
    }

    #[tokio::test]
    async fn fetches_once_within_expiry_window() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(token_path())
                    .header("X-API-Key-Id", API_KEY_ID)
                    .header("X-API-Key", API_KEY);
                then.status(200).json_body(json!({ "accessToken": "token-1" }));
            })
            .await;

        let store = MemoryStore::new();
        let tokens = manager(&store, upstream(&server));

        for _ in 0..3 {
            assert_eq!(tokens.get_token().await.unwrap(), "token-1");
        }
        mock.assert_calls_async(1).await;

        let cached = Credential::load(&store).await.unwrap().expect("cached credential");
        let lifetime_left = cached.expires_at_ms - now_ms();
        assert!(lifetime_left > POLICY.lifetime_ms - 60_000 && lifetime_left <= POLICY.lifetime_ms);
    }

    #[tokio::test]
    async fn expired_credential_is_replaced() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(token_path());
                then.status(200).json_body(json!({ "accessToken": "token-fresh" }));
            })
            .await;

        let store = MemoryStore::new();
        Credential {
            value: "token-stale".into(),
            expires_at_ms: now_ms() - 1,
        }
        .save(&store)
        .await
        .unwrap();

        let tokens = manager(&store, upstream(&server));
        assert_eq!(tokens.get_token().await.unwrap(), "token-fresh");
        assert_eq!(tokens.get_token().await.unwrap(), "token-fresh");
        mock.assert_calls_async(1).await;

        let cached = Credential::load(&store).await.unwrap().unwrap();
        assert_eq!(cached.value, "token-fresh");
    }

    #[tokio::test]
    async fn credential_inside_skew_is_refreshed() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(token_path());
                then.status(200).json_body(json!({ "accessToken": "token-new" }));
            })
            .await;

        let store = MemoryStore::new();
        // still unexpired, but within the five minute skew
        Credential {
            value: "token-old".into(),
            expires_at_ms: now_ms() + 60_000,
        }
        .save(&store)
        .await
        .unwrap();

        let tokens = manager(&store, upstream(&server));
        assert_eq!(tokens.get_token().await.unwrap(), "token-new");
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn unauthorized_identity_response_embeds_status() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(token_path());
                then.status(401).body("invalid api key");
            })
            .await;

        let store = MemoryStore::new();
        let tokens = manager(&store, upstream(&server));

        match tokens.get_token().await {
            Err(ProxyError::UpstreamAuth { status, message }) => {
                assert_eq!(status, Some(401));
                assert!(message.contains("401"), "{}", message);
                assert!(message.contains("invalid api key"), "{}", message);
            }
            other => panic!("expected upstream auth error, got {:?}", other),
        }
        mock.assert_calls_async(1).await;
        // nothing cached after a failure
        assert_eq!(Credential::load(&store).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_identity_endpoint_is_an_auth_error() {
        let mut cfg = UpstreamConfig {
            api_key: Some(API_KEY.into()),
            api_key_id: Some(API_KEY_ID.into()),
            org_id: Some(ORG_ID.into()),
            ..Default::default()
        };
        // nothing listens on the discard port
        cfg.identity_url = "http://127.0.0.1:9".into();

        let tokens = manager(&MemoryStore::new(), cfg);
        assert!(matches!(
            tokens.get_token().await,
            Err(ProxyError::UpstreamAuth { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn missing_credentials_skip_network() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(token_path());
                then.status(200).json_body(json!({ "accessToken": "never" }));
            })
            .await;

        let mut cfg = upstream(&server);
        cfg.api_key_id = None;
        let tokens = manager(&MemoryStore::new(), cfg);

        match tokens.get_token().await {
            Err(ProxyError::Config { missing }) => assert_eq!(missing, vec!["API_KEY_ID"]),
            other => panic!("expected config error, got {:?}", other),
        }
        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn status_reports_cached_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(token_path());
                then.status(200).json_body(json!({ "accessToken": "abcdefghijklmnop" }));
            })
            .await;

        let tokens = manager(&MemoryStore::new(), upstream(&server));
        assert!(!tokens.status().await.unwrap().has_token);

        tokens.get_token().await.unwrap();
        let status = tokens.status().await.unwrap();
        assert!(status.has_token);
        assert!(status.is_valid);
        assert_eq!(status.token_preview.as_deref(), Some("abcdefghij..."));
    }
}
