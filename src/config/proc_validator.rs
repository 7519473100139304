//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - credentials present, agent id positive
//! - cache path usable when persistence is on
//! - api base is an http(s) url
//! - logging level / format

use tracing::{error, info};

use crate::config::settings::{LoggingConfig, NotifyConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_notify_config(cfg: &NotifyConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_credentials(cfg, &mut errors);
    validate_cache(cfg, &mut errors);
    validate_api_base(&cfg.api_base, &mut errors);
    if let Some(logging) = &cfg.logging {
        validate_logging(logging, &mut errors);
    }

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_credentials(cfg: &NotifyConfig, errors: &mut Vec<String>) {
    if cfg.corp_id.trim().is_empty() {
        errors.push("config: 'corp_id' is empty".to_string());
    }
    if cfg.app_secret.trim().is_empty() {
        errors.push("config: 'app_secret' is empty".to_string());
    }
    if cfg.agent_id <= 0 {
        errors.push(format!("config: 'agent_id' must be positive, got {}", cfg.agent_id));
    }
}

fn validate_cache(cfg: &NotifyConfig, errors: &mut Vec<String>) {
    if !cfg.token_persist {
        return;
    }
    let path = cfg.cache_file_path.trim();
    if path.is_empty() {
        errors.push("config: 'cache_file_path' is empty while 'token_persist' is on".to_string());
    } else if path.ends_with('/') {
        errors.push(format!("config: 'cache_file_path' '{}' points to a directory", path));
    }
}

fn validate_api_base(api_base: &str, errors: &mut Vec<String>) {
    if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
        errors.push(format!("config: 'api_base' '{}' must start with http:// or https://", api_base));
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    let level = logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "config: logging.level '{}' is not one of {}",
            logging.level,
            LOG_LEVELS.join(", ")
        ));
    }
}
