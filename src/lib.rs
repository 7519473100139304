//! # WeCom Notify Library
//!
//! Client for the WeCom application message API: fetches and caches the
//! access token (optionally persisted to a file with atomic replace), sends
//! typed messages and uploads temporary media.
//!
//! Modules:
//! - `client`: the [`Notifier`] handle
//! - `cache`: token state, token manager, cache file
//! - `sources`: credential exchange
//! - `message`: message variants, receivers, options, envelope, results
//! - `dispatch`: send with token retry, media upload
//! - `config`: YAML configuration and validation

pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod helpers;
pub mod message;
pub mod observability;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;


pub use crate::cache::token::Token;
pub use crate::client::Notifier;
pub use crate::config::settings::NotifyConfig;
pub use crate::dispatch::upload::{MediaType, UploadMedia, UploadMediaResult};
pub use crate::error::{NotifyError, Result};
pub use crate::message::options::MessageOptions;
pub use crate::message::receiver::MessageReceiver;
pub use crate::message::result::MessageResult;
pub use crate::message::types::*;
pub use crate::message::{Message, MessageKind};
