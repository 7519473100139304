use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the notifier.
///
/// Remote failures that the API reports inside a decoded body (anything other
/// than a token exchange failure) are not errors: they come back inside
/// [`MessageResult`](crate::message::result::MessageResult) and
/// [`UploadMediaResult`](crate::dispatch::upload::UploadMediaResult).
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("message can not be empty")]
    MissingMessage,

    #[error("message receiver not set, set at least one of touser, toparty, totag")]
    MissingReceiver,

    #[error("unrecognized message type: {0}")]
    UnrecognizedMessageType(String),

    #[error("invalid '{msgtype}' payload: {source}")]
    InvalidPayload {
        msgtype: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid message option: {0}")]
    InvalidOption(String),

    #[error("token exchange failed ({code}): {message}")]
    TokenExchange { code: i64, message: String },

    #[error("{context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token cache: {0}")]
    Persistence(String),

    #[error("invalid config: {}", .0.join("; "))]
    Config(Vec<String>),
}

impl NotifyError {
    pub(crate) fn http(context: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| NotifyError::Http { context, source }
    }

    pub(crate) fn decode(context: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| NotifyError::Decode { context, source }
    }

    /// True for failures raised locally before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NotifyError::MissingMessage
                | NotifyError::MissingReceiver
                | NotifyError::UnrecognizedMessageType(_)
                | NotifyError::InvalidPayload { .. }
                | NotifyError::InvalidOption(_)
        )
    }
}

pub type Result<T, E = NotifyError> = std::result::Result<T, E>;
