use std::fmt;
use std::time::Instant;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::cache::token::TokenState;
use crate::error::{NotifyError, Result};
use crate::helpers::time::expires_at_from_ttl;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK};
use crate::utils::constants::PATH_GET_TOKEN;

/// Static credentials identifying the calling application.
#[derive(Clone)]
pub struct Credentials {
    pub corp_id: String,
    pub agent_id: i64,
    app_secret: String,
}

impl Credentials {
    pub fn new(corp_id: impl Into<String>, agent_id: i64, app_secret: impl Into<String>) -> Self {
        Self {
            corp_id: corp_id.into(),
            agent_id,
            app_secret: app_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("corp_id", &self.corp_id)
            .field("agent_id", &self.agent_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Body of `GET /gettoken`.
#[derive(Debug, Deserialize)]
pub struct GetTokenResult {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// Exchange corp id + secret for a fresh access token.
pub async fn fetch_token(client: &Client, api_base: &str, credentials: &Credentials) -> Result<TokenState> {
    let metrics = get_metrics().await;
    let start = Instant::now();
    let fetched = request_token(client, api_base, credentials).await;
    metrics.token_refresh_duration.observe(start.elapsed().as_secs_f64());

    match fetched {
        Ok(state) => {
            metrics.token_refresh_requests.with_label_values(&[OUTCOME_OK]).inc();
            metrics.token_expiry_unix.set(state.token_expires_at);
            debug!("token: refreshed for corp '{}', expires at {}", credentials.corp_id, state.token_expires_at);
            Ok(state)
        }
        Err(err) => {
            metrics.token_refresh_requests.with_label_values(&[OUTCOME_ERROR]).inc();
            error!("token: refresh for corp '{}' failed: {}", credentials.corp_id, err);
            Err(err)
        }
    }
}

async fn request_token(client: &Client, api_base: &str, credentials: &Credentials) -> Result<TokenState> {
    let url = format!("{}{}", api_base, PATH_GET_TOKEN);
    let response = client
        .get(&url)
        .query(&[
            ("corpid", credentials.corp_id.as_str()),
            ("corpsecret", credentials.app_secret.as_str()),
        ])
        .send()
        .await
        .map_err(NotifyError::http("token get request error"))?;
    let body = response
        .bytes()
        .await
        .map_err(NotifyError::http("token get request error"))?;

    let result: GetTokenResult =
        serde_json::from_slice(&body).map_err(NotifyError::decode("token result decode error"))?;
    if result.errcode != 0 {
        return Err(NotifyError::TokenExchange {
            code: result.errcode,
            message: result.errmsg,
        });
    }

    Ok(TokenState::new(result.access_token, expires_at_from_ttl(result.expires_in)))
}
