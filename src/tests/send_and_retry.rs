// Send path against fake endpoints:
//  - validation failures never reach the network
//  - a token-rejected reply (42001 / 40014) causes one refresh and one resend
//  - other remote codes come back inside the result

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::Query;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::Value;

    use crate::error::NotifyError;
    use crate::message::types::{News, NewsArticle};
    use crate::observability::metrics::get_metrics;
    use crate::tests::common::{json, mock_gettoken, mock_send, notifier_for, spawn_axum, AGENT_ID};
    use crate::{Message, MessageOptions, MessageReceiver};

    fn receiver() -> MessageReceiver {
        MessageReceiver::new().with_users(["zhangsan", "lisi"])
    }

    #[tokio::test]
    async fn empty_receiver_fails_before_any_request() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-1", 7200).await;
        let send = mock_send(&server, json!({"errcode": 0, "errmsg": "ok"})).await;
        let notifier = notifier_for(&server.base_url());

        let err = notifier
            .send(&MessageReceiver::new(), &Message::text("hi"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::MissingReceiver));
        assert_eq!(gettoken.hits_async().await, 0);
        assert_eq!(send.hits_async().await, 0);
    }

    #[tokio::test]
    async fn unknown_msgtype_fails_before_any_request() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-1", 7200).await;
        let send = mock_send(&server, json!({"errcode": 0, "errmsg": "ok"})).await;
        let notifier = notifier_for(&server.base_url());

        let err = notifier
            .send_value(&receiver(), "location", json!({"lat": 1.0}), None)
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::UnrecognizedMessageType(ref t) if t == "location"));
        assert_eq!(gettoken.hits_async().await, 0);
        assert_eq!(send.hits_async().await, 0);
    }

    #[tokio::test]
    async fn null_payload_is_rejected_before_receiver_check() {
        let server = MockServer::start_async().await;
        let send = mock_send(&server, json!({"errcode": 0, "errmsg": "ok"})).await;
        let notifier = notifier_for(&server.base_url());

        let err = notifier
            .send_value(&MessageReceiver::new(), "text", Value::Null, None)
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::MissingMessage));
        assert_eq!(send.hits_async().await, 0);
    }

    #[tokio::test]
    async fn invalid_option_fails_before_any_request() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-1", 7200).await;
        let notifier = notifier_for(&server.base_url());

        let options = MessageOptions::new().duplicate_check(Some(5 * 60 * 60));
        let err = notifier
            .send(&receiver(), &Message::text("hi"), Some(&options))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::InvalidOption(_)));
        assert_eq!(gettoken.hits_async().await, 0);
    }

    #[tokio::test]
    async fn successful_send_reports_partial_failures() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-1", 7200).await;
        let send = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/message/send")
                    .query_param("access_token", "tok-1");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({
                        "errcode": 0,
                        "errmsg": "ok",
                        "invaliduser": "ghost",
                        "invalidparty": "",
                        "invalidtag": "",
                        "msgid": "msg-1"
                    }));
            })
            .await;
        let notifier = notifier_for(&server.base_url());

        let result = notifier.send(&receiver(), &Message::text("hi"), None).await.unwrap();

        assert!(result.is_ok());
        assert_eq!(result.invalid_users(), vec!["ghost"]);
        assert_eq!(result.msgid, "msg-1");
        assert_eq!(gettoken.hits_async().await, 1);
        assert_eq!(send.hits_async().await, 1);

        let exported = get_metrics().await.encode_text().unwrap();
        assert!(exported.contains("wecomnotify_messages_sent_total"));
    }

    #[tokio::test]
    async fn persistent_token_rejection_retries_exactly_once() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-1", 7200).await;
        let send = mock_send(&server, json!({"errcode": 42001, "errmsg": "access_token expired"})).await;
        let notifier = notifier_for(&server.base_url());

        let result = notifier.send(&receiver(), &Message::text("hi"), None).await.unwrap();

        // second attempt's reply is returned as is, no further loop
        assert_eq!(result.errcode, 42001);
        assert_eq!(gettoken.hits_async().await, 2);
        assert_eq!(send.hits_async().await, 2);
    }

    #[tokio::test]
    async fn remote_error_is_returned_in_result_without_retry() {
        let server = MockServer::start_async().await;
        let gettoken = mock_gettoken(&server, "tok-1", 7200).await;
        let send = mock_send(&server, json!({"errcode": 81013, "errmsg": "user & party & tag all invalid"})).await;
        let notifier = notifier_for(&server.base_url());

        let result = notifier.send(&receiver(), &Message::text("hi"), None).await.unwrap();

        assert_eq!(result.errcode, 81013);
        assert!(!result.is_ok());
        assert_eq!(gettoken.hits_async().await, 1);
        assert_eq!(send.hits_async().await, 1);
    }

    #[tokio::test]
    async fn token_exchange_failure_aborts_the_send() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.path("/gettoken");
                then.status(200).json_body(json!({"errcode": 40001, "errmsg": "invalid credential"}));
            })
            .await;
        let send = mock_send(&server, json!({"errcode": 0, "errmsg": "ok"})).await;
        let notifier = notifier_for(&server.base_url());

        let err = notifier.send(&receiver(), &Message::text("hi"), None).await.unwrap_err();

        assert!(matches!(err, NotifyError::TokenExchange { code: 40001, .. }));
        assert_eq!(send.hits_async().await, 0);
    }

    #[tokio::test]
    async fn malformed_send_reply_is_a_decode_error() {
        let server = MockServer::start_async().await;
        mock_gettoken(&server, "tok-1", 7200).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/message/send");
                then.status(200).body("not json");
            })
            .await;
        let notifier = notifier_for(&server.base_url());

        let err = notifier.send(&receiver(), &Message::text("hi"), None).await.unwrap_err();
        assert!(matches!(err, NotifyError::Decode { .. }), "got {err}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn invalid_token_reply_refreshes_and_resends_with_new_token() {
        // token endpoint hands out tok-1 first, tok-2 afterwards
        let exchanges = Arc::new(AtomicUsize::new(0));
        let exchanges_clone = exchanges.clone();

        // send endpoint rejects tok-1 and records every accepted envelope
        let sends = Arc::new(AtomicUsize::new(0));
        let sends_clone = sends.clone();
        let accepted: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let accepted_clone = accepted.clone();

        let router = Router::new()
            .route("/gettoken", get(move || {
                let c = exchanges_clone.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(json!({"errcode": 0, "errmsg": "ok", "access_token": format!("tok-{n}"), "expires_in": 7200}))
                }
            }))
            .route("/message/send", post(move |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| {
                let c = sends_clone.clone();
                let accepted = accepted_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    if query.get("access_token").map(String::as_str) == Some("tok-1") {
                        return Json(json!({"errcode": 40014, "errmsg": "invalid access_token"}));
                    }
                    accepted.lock().unwrap().push(body);
                    Json(json!({"errcode": 0, "errmsg": "ok", "invaliduser": "", "msgid": "m-2"}))
                }
            }));
        let (handle, addr) = spawn_axum(router).await;
        let notifier = notifier_for(&format!("http://{}", addr));

        let news = News {
            articles: vec![
                NewsArticle { title: "release".into(), url: "https://example.com/r".into(), ..Default::default() },
                NewsArticle { title: "changelog".into(), url: "https://example.com/c".into(), ..Default::default() },
            ],
        };
        let options = MessageOptions { enable_duplicate_check: false, duplicate_check_interval: 900, ..Default::default() };
        let result = notifier.send(&receiver(), &news.into(), Some(&options)).await.unwrap();

        assert!(result.is_ok());
        assert_eq!(result.msgid, "m-2");
        assert_eq!(exchanges.load(Ordering::SeqCst), 2, "one initial exchange, one forced refresh");
        assert_eq!(sends.load(Ordering::SeqCst), 2, "one rejected send, one resend");
        assert_eq!(notifier.get_token().await.unwrap().value, "tok-2");

        let accepted = accepted.lock().unwrap().clone();
        assert_eq!(accepted.len(), 1);
        let envelope = &accepted[0];
        assert_eq!(envelope["msgtype"], "news");
        assert_eq!(envelope["agentid"], AGENT_ID);
        assert_eq!(envelope["touser"], "zhangsan|lisi");
        assert_eq!(envelope["news"]["articles"].as_array().unwrap().len(), 2);
        assert!(envelope.get("duplicate_check_interval").is_none());
        assert!(envelope.get("enable_duplicate_check").is_none());

        handle.abort();
    }
}
