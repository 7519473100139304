use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tokio::fs;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::settings::NotifyConfig;
use crate::error::NotifyError;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<NotifyConfig> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("read config file '{}'", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded)
}

pub fn parse_config(content: String) -> Result<NotifyConfig> {
    let mut config: NotifyConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    config.api_base = config.api_base.trim_end_matches('/').to_owned();

    debug!("validation config ...");
    proc_validator::validate_notify_config(&config).map_err(NotifyError::Config)?;

    Ok(config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("valid env var pattern");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
