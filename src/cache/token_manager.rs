use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::token::{Token, TokenState};
use crate::cache::token_file::TokenFile;
use crate::error::{NotifyError, Result};
use crate::helpers::time::now_i64;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK};
use crate::sources::credential_exchange::{fetch_token, Credentials};
use crate::utils::constants::{DEFAULT_API_BASE, DEFAULT_CACHE_FILE_PATH};

static OP_LOAD: &str = "load";
static OP_SAVE: &str = "save";

#[derive(Debug, Default)]
struct Inner {
    state: TokenState,
    // set once the cache file has been consulted for the current path
    cache_checked: bool,
}

/// Owns the access token of one client.
///
/// Expiry check, refresh and persistence all run under a single async mutex,
/// so concurrent callers share one refresh and never observe a torn
/// `{token, expiry}` pair.
///
/// Persistence is opt-in. When it is off the manager never touches disk; when
/// it is on, cache failures are logged and counted but never fail a call that
/// otherwise produced a valid token.
#[derive(Debug)]
pub struct TokenManager {
    client: Client,
    api_base: String,
    credentials: Credentials,
    persist: bool,
    file: TokenFile,
    inner: Mutex<Inner>,
}

impl TokenManager {
    pub fn new(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_owned(),
            credentials,
            persist: false,
            file: TokenFile::new(DEFAULT_CACHE_FILE_PATH),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_api_base(&mut self, api_base: impl Into<String>) {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn enable_token_persist(&mut self) {
        self.persist = true;
        self.inner.get_mut().cache_checked = false;
    }

    pub fn token_persist(&self) -> bool {
        self.persist
    }

    pub fn set_cache_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file = TokenFile::new(path);
        self.inner.get_mut().cache_checked = false;
    }

    pub fn cache_file_path(&self) -> &Path {
        self.file.path()
    }

    /// Return the current token, refreshing it first when unset or expired.
    pub async fn get_token(&self) -> Result<Token> {
        let mut inner = self.inner.lock().await;
        if inner.state.is_valid() {
            return Ok(inner.state.token());
        }

        if self.persist && !inner.cache_checked {
            inner.cache_checked = true;
            if let Ok(cached) = self.read_cache().await {
                inner.state = cached;
                return Ok(inner.state.token());
            }
        }

        self.refresh_locked(&mut inner).await
    }

    /// Refresh after the API rejected `stale`.
    ///
    /// When another caller already replaced `stale` with a valid token while
    /// this one waited for the lock, that token is returned without a second
    /// exchange.
    pub async fn force_refresh(&self, stale: &str) -> Result<Token> {
        let mut inner = self.inner.lock().await;
        if inner.state.access_token != stale && inner.state.is_valid() {
            debug!("token: already refreshed by a concurrent caller");
            return Ok(inner.state.token());
        }
        self.refresh_locked(&mut inner).await
    }

    /// Adopt the cache file's token if it has not expired yet.
    pub async fn load_cache(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.cache_checked = true;
        let cached = self.read_cache().await?;
        inner.state = cached;
        Ok(())
    }

    /// Persist the in-memory token state.
    pub async fn save_cache(&self) -> Result<()> {
        let inner = self.inner.lock().await;
        self.write_cache(&inner.state).await
    }

    async fn refresh_locked(&self, inner: &mut Inner) -> Result<Token> {
        let fresh = fetch_token(&self.client, &self.api_base, &self.credentials).await?;
        inner.state = fresh;

        if self.persist {
            // an unpersisted token is still a usable token
            if let Err(err) = self.write_cache(&inner.state).await {
                warn!("token cache not updated: {}", err);
            }
        }
        Ok(inner.state.token())
    }

    async fn read_cache(&self) -> Result<TokenState> {
        if !self.persist {
            return Err(NotifyError::Persistence("token persist not enabled".to_owned()));
        }
        let metrics = get_metrics().await;
        let loaded = self.file.load().await.and_then(|cached| {
            if cached.is_valid_at(now_i64()) {
                Ok(cached)
            } else {
                Err(NotifyError::Persistence("cached token expired".to_owned()))
            }
        });

        match &loaded {
            Ok(cached) => {
                metrics.token_cache_operations.with_label_values(&[OP_LOAD, OUTCOME_OK]).inc();
                metrics.token_expiry_unix.set(cached.token_expires_at);
                info!("token cache: loaded token from {}, expires at {}", self.file.path().display(), cached.token_expires_at);
            }
            Err(err) => {
                metrics.token_cache_operations.with_label_values(&[OP_LOAD, OUTCOME_ERROR]).inc();
                debug!("token cache: no usable token in {}: {}", self.file.path().display(), err);
            }
        }
        loaded
    }

    async fn write_cache(&self, state: &TokenState) -> Result<()> {
        if !self.persist {
            return Err(NotifyError::Persistence("token persist not enabled".to_owned()));
        }
        let metrics = get_metrics().await;
        let saved = self.file.save(state).await;
        let outcome = if saved.is_ok() { OUTCOME_OK } else { OUTCOME_ERROR };
        metrics.token_cache_operations.with_label_values(&[OP_SAVE, outcome]).inc();
        saved
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, state: TokenState) {
        let mut inner = self.inner.lock().await;
        inner.state = state;
        inner.cache_checked = true;
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> TokenState {
        self.inner.lock().await.state.clone()
    }
}
