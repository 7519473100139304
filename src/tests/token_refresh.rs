#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::Method::GET;
    use httpmock::MockServer;
    use tokio::task::JoinSet;

    use crate::cache::token::TokenState;
    use crate::error::NotifyError;
    use crate::helpers::time::now_i64;
    use crate::tests::common::{json, mock_gettoken, notifier_for, valid_state};

    #[tokio::test]
    async fn unexpired_token_is_returned_without_exchange() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "fresh", 7200).await;
        let notifier = notifier_for(&server.base_url());

        let seeded = valid_state("cached-token");
        notifier.token_manager().seed(seeded.clone()).await;

        let token = notifier.get_token().await.unwrap();
        assert_eq!(token.value, "cached-token");
        assert_eq!(token.expires_at, seeded.token_expires_at);
        assert_eq!(gettoken.hits_async().await, 0);
    }

    #[tokio::test]
    async fn cold_manager_refreshes_once_then_reuses() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-1", 7200).await;
        let notifier = notifier_for(&server.base_url());

        let before = now_i64();
        let first = notifier.get_token().await.unwrap();
        let second = notifier.get_token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.value, "tok-1");
        assert!(first.expires_at >= before + 7200);
        assert!(first.expires_at <= now_i64() + 7200);
        assert_eq!(gettoken.hits_async().await, 1);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_exactly_once() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-new", 7200).await;
        let notifier = notifier_for(&server.base_url());

        notifier
            .token_manager()
            .seed(TokenState::new("tok-old".to_owned(), now_i64() - 1))
            .await;

        let token = notifier.get_token().await.unwrap();
        assert_eq!(token.value, "tok-new");
        assert_eq!(gettoken.hits_async().await, 1);

        let state = notifier.token_manager().snapshot().await;
        assert_eq!(state.access_token, "tok-new");
        assert!(state.token_expires_at > now_i64());
    }

    #[tokio::test]
    async fn token_expiring_this_second_is_not_used() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-new", 7200).await;
        let notifier = notifier_for(&server.base_url());

        // valid strictly before expiry
        notifier
            .token_manager()
            .seed(TokenState::new("tok-edge".to_owned(), now_i64()))
            .await;

        let token = notifier.get_token().await.unwrap();
        assert_eq!(token.value, "tok-new");
        assert_eq!(gettoken.hits_async().await, 1);
    }

    #[tokio::test]
    async fn remote_exchange_error_carries_vendor_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gettoken");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"errcode": 40013, "errmsg": "invalid corpid"}));
            })
            .await;
        let notifier = notifier_for(&server.base_url());

        let err = notifier.get_token().await.unwrap_err();
        match err {
            NotifyError::TokenExchange { code, message } => {
                assert_eq!(code, 40013);
                assert_eq!(message, "invalid corpid");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(notifier.token_manager().snapshot().await, TokenState::default());
    }

    #[tokio::test]
    async fn malformed_exchange_reply_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gettoken");
                then.status(502).body("<html>bad gateway</html>");
            })
            .await;
        let notifier = notifier_for(&server.base_url());

        let err = notifier.get_token().await.unwrap_err();
        assert!(matches!(err, NotifyError::Decode { .. }), "got {err}");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // nothing listens on port 9 of localhost in the test environment
        let notifier = notifier_for("http://127.0.0.1:9");
        let err = notifier.get_token().await.unwrap_err();
        assert!(matches!(err, NotifyError::Http { .. }), "got {err}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_cold_callers_share_one_refresh() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-shared", 7200).await;
        let notifier = Arc::new(notifier_for(&server.base_url()));

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let notifier = notifier.clone();
            tasks.spawn(async move { notifier.get_token().await });
        }

        while let Some(joined) = tasks.join_next().await {
            let token = joined.expect("task").expect("token");
            assert_eq!(token.value, "tok-shared");
        }
        assert_eq!(gettoken.hits_async().await, 1);
    }

    #[tokio::test]
    async fn force_refresh_reuses_token_replaced_by_another_caller() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-x", 7200).await;
        let notifier = notifier_for(&server.base_url());

        notifier.token_manager().seed(valid_state("tok-replaced")).await;

        let token = notifier.token_manager().force_refresh("tok-stale").await.unwrap();
        assert_eq!(token.value, "tok-replaced");
        assert_eq!(gettoken.hits_async().await, 0);

        let token = notifier.token_manager().force_refresh("tok-replaced").await.unwrap();
        assert_eq!(token.value, "tok-x");
        assert_eq!(gettoken.hits_async().await, 1);
    }
}
