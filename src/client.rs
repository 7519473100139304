use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use crate::cache::token::Token;
use crate::cache::token_manager::TokenManager;
use crate::config::proc_validator::validate_notify_config;
use crate::config::settings::NotifyConfig;
use crate::error::{NotifyError, Result};
use crate::sources::credential_exchange::Credentials;
use crate::utils::constants::DEFAULT_HTTP_TIMEOUT_MS;

/// Client of one WeCom application.
///
/// Cheap to share behind an `Arc`: token refreshes are serialized inside the
/// [`TokenManager`].
#[derive(Debug)]
pub struct Notifier {
    pub(crate) agent_id: i64,
    pub(crate) client: Client,
    pub(crate) tokens: TokenManager,
}

impl Notifier {
    /// Client with token persistence off and the default endpoints.
    pub fn new(corp_id: impl Into<String>, agent_id: i64, app_secret: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS))
            .build()
            .map_err(NotifyError::http("build http client"))?;
        let credentials = Credentials::new(corp_id, agent_id, app_secret);
        Ok(Self {
            agent_id,
            tokens: TokenManager::new(client.clone(), credentials),
            client,
        })
    }

    /// Client built from a validated config. With persistence on, the cache
    /// file is read right away; a missing or stale cache is not an error.
    pub async fn from_config(config: &NotifyConfig) -> Result<Self> {
        validate_notify_config(config).map_err(NotifyError::Config)?;

        let mut notifier = Self::new(config.corp_id.to_owned(), config.agent_id, config.app_secret.to_owned())?;
        notifier.set_api_base(config.api_base.to_owned());
        notifier.set_cache_file_path(&config.cache_file_path);
        if config.token_persist {
            notifier.enable_token_persist();
            match notifier.tokens.load_cache().await {
                Ok(()) => info!("notifier: reusing cached token from {}", config.cache_file_path),
                Err(err) => debug!("notifier: starting without cached token: {}", err),
            }
        }
        Ok(notifier)
    }

    pub fn agent_id(&self) -> i64 {
        self.agent_id
    }

    /// Keep the access token in the cache file across restarts.
    ///
    /// The file is consulted on the next token lookup.
    pub fn enable_token_persist(&mut self) {
        self.tokens.enable_token_persist();
    }

    pub fn set_cache_file_path(&mut self, path: impl Into<PathBuf>) {
        self.tokens.set_cache_file_path(path);
    }

    /// Point the client at another API root, e.g. an egress proxy.
    pub fn set_api_base(&mut self, api_base: impl Into<String>) {
        self.tokens.set_api_base(api_base);
    }

    pub fn api_base(&self) -> &str {
        self.tokens.api_base()
    }

    pub async fn get_token(&self) -> Result<Token> {
        self.tokens.get_token().await
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }
}
