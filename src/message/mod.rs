//! Messages, receivers, options and the request envelope built from them.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{NotifyError, Result};

pub mod envelope;
pub mod options;
pub mod receiver;
pub mod result;
pub mod types;

use types::*;

/// Discriminator of a message: the `msgtype` value and the envelope key that
/// carries the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Text,
    Image,
    Voice,
    Video,
    File,
    TextCard,
    News,
    MpNews,
    Markdown,
    MiniProgram,
    TaskCard,
}

impl MessageKind {
    pub const ALL: [MessageKind; 11] = [
        MessageKind::Text,
        MessageKind::Image,
        MessageKind::Voice,
        MessageKind::Video,
        MessageKind::File,
        MessageKind::TextCard,
        MessageKind::News,
        MessageKind::MpNews,
        MessageKind::Markdown,
        MessageKind::MiniProgram,
        MessageKind::TaskCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Voice => "voice",
            MessageKind::Video => "video",
            MessageKind::File => "file",
            MessageKind::TextCard => "textcard",
            MessageKind::News => "news",
            MessageKind::MpNews => "mpnews",
            MessageKind::Markdown => "markdown",
            MessageKind::MiniProgram => "miniprogram_notice",
            MessageKind::TaskCard => "taskcard",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = NotifyError;

    fn from_str(raw: &str) -> Result<Self> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| NotifyError::UnrecognizedMessageType(raw.to_owned()))
    }
}

/// Every message the API accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(Text),
    Image(Image),
    Voice(Voice),
    Video(Video),
    File(File),
    TextCard(TextCard),
    News(News),
    MpNews(MpNews),
    Markdown(Markdown),
    MiniProgram(MiniProgram),
    TaskCard(TaskCard),
}

impl Message {
    pub fn text(content: impl Into<String>) -> Self {
        Message::Text(Text { content: content.into() })
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Message::Markdown(Markdown { content: content.into() })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Text(_) => MessageKind::Text,
            Message::Image(_) => MessageKind::Image,
            Message::Voice(_) => MessageKind::Voice,
            Message::Video(_) => MessageKind::Video,
            Message::File(_) => MessageKind::File,
            Message::TextCard(_) => MessageKind::TextCard,
            Message::News(_) => MessageKind::News,
            Message::MpNews(_) => MessageKind::MpNews,
            Message::Markdown(_) => MessageKind::Markdown,
            Message::MiniProgram(_) => MessageKind::MiniProgram,
            Message::TaskCard(_) => MessageKind::TaskCard,
        }
    }

    /// JSON payload stored under the discriminator key of the envelope.
    pub fn payload(&self) -> Result<Value> {
        let encoded = match self {
            Message::Text(m) => serde_json::to_value(m),
            Message::Image(m) => serde_json::to_value(m),
            Message::Voice(m) => serde_json::to_value(m),
            Message::Video(m) => serde_json::to_value(m),
            Message::File(m) => serde_json::to_value(m),
            Message::TextCard(m) => serde_json::to_value(m),
            Message::News(m) => serde_json::to_value(m),
            Message::MpNews(m) => serde_json::to_value(m),
            Message::Markdown(m) => serde_json::to_value(m),
            Message::MiniProgram(m) => serde_json::to_value(m),
            Message::TaskCard(m) => serde_json::to_value(m),
        };
        encoded.map_err(|source| NotifyError::InvalidPayload {
            msgtype: self.kind().as_str().to_owned(),
            source,
        })
    }

    /// Build a message from a raw discriminator and its JSON payload.
    ///
    /// A null payload is a missing message; a discriminator outside the known
    /// set fails with [`NotifyError::UnrecognizedMessageType`].
    pub fn from_value(msgtype: &str, payload: Value) -> Result<Self> {
        if payload.is_null() {
            return Err(NotifyError::MissingMessage);
        }
        let kind: MessageKind = msgtype.parse()?;
        let invalid = |source: serde_json::Error| NotifyError::InvalidPayload {
            msgtype: msgtype.to_owned(),
            source,
        };

        let message = match kind {
            MessageKind::Text => Message::Text(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::Image => Message::Image(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::Voice => Message::Voice(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::Video => Message::Video(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::File => Message::File(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::TextCard => Message::TextCard(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::News => Message::News(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::MpNews => Message::MpNews(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::Markdown => Message::Markdown(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::MiniProgram => Message::MiniProgram(serde_json::from_value(payload).map_err(invalid)?),
            MessageKind::TaskCard => Message::TaskCard(serde_json::from_value(payload).map_err(invalid)?),
        };
        Ok(message)
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Message {
                fn from(payload: $variant) -> Self {
                    Message::$variant(payload)
                }
            }
        )*
    };
}

impl_from_payload!(Text, Image, Voice, Video, File, TextCard, News, MpNews, Markdown, MiniProgram, TaskCard);
