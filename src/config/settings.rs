use std::fmt;

use serde::Deserialize;

use crate::utils::constants::{DEFAULT_API_BASE, DEFAULT_CACHE_FILE_PATH};

/// ================================
/// Client configuration
/// ================================
#[derive(Deserialize, Clone)]
pub struct NotifyConfig {
    /// Corp id, shown on the "my company" page of the admin console.
    pub corp_id: String,
    /// Agent id and secret are shown on the application page.
    pub agent_id: i64,
    pub app_secret: String,
    #[serde(default)]
    pub token_persist: bool,
    #[serde(default = "default_cache_file_path")]
    pub cache_file_path: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub logging: Option<LoggingConfig>,
}

impl NotifyConfig {
    pub fn new(corp_id: impl Into<String>, agent_id: i64, app_secret: impl Into<String>) -> Self {
        Self {
            corp_id: corp_id.into(),
            agent_id,
            app_secret: app_secret.into(),
            token_persist: false,
            cache_file_path: default_cache_file_path(),
            api_base: default_api_base(),
            logging: None,
        }
    }
}

impl fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("corp_id", &self.corp_id)
            .field("agent_id", &self.agent_id)
            .field("app_secret", &"<redacted>")
            .field("token_persist", &self.token_persist)
            .field("cache_file_path", &self.cache_file_path)
            .field("api_base", &self.api_base)
            .field("logging", &self.logging)
            .finish()
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level: level, format: format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn default_cache_file_path() -> String {
    DEFAULT_CACHE_FILE_PATH.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
