// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;

use httpmock::Method::{GET, POST};
use httpmock::{Mock, MockServer};

use crate::cache::token::TokenState;
use crate::helpers::time::now_i64;
use crate::Notifier;

pub const CORP_ID: &str = "ww-test-corp";
pub const AGENT_ID: i64 = 1000002;
pub const APP_SECRET: &str = "test-app-secret";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Notifier without persistence talking to `base_url`.
pub fn notifier_for(base_url: &str) -> Notifier {
    let mut notifier = Notifier::new(CORP_ID, AGENT_ID, APP_SECRET).expect("notifier");
    notifier.set_api_base(base_url);
    notifier
}

pub fn valid_state(token: &str) -> TokenState {
    TokenState::new(token.to_owned(), now_i64() + 3600)
}

pub async fn mock_gettoken<'a>(server: &'a MockServer, token: &str, expires_in: i64) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/gettoken")
                .query_param("corpid", CORP_ID)
                .query_param("corpsecret", APP_SECRET);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "errcode": 0,
                    "errmsg": "ok",
                    "access_token": token,
                    "expires_in": expires_in
                }));
        })
        .await
}

pub async fn mock_send<'a>(server: &'a MockServer, body: serde_json::Value) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/message/send");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(body);
        })
        .await
}
