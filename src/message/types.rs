//! Payload shapes accepted by `message/send`.
//!
//! Length limits are the ones the API documents; they are not enforced here,
//! the API truncates or rejects on its own.

use serde::{Deserialize, Serialize};

/// Text message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    /// Up to 2048 bytes, longer content is truncated. Supports id translation.
    pub content: String,
}

/// Image message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Id returned by a temporary media upload.
    pub media_id: String,
}

/// Voice message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub media_id: String,
}

/// Video message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub media_id: String,
    /// Up to 128 bytes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Up to 512 bytes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// File message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub media_id: String,
}

/// Text card message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCard {
    /// Up to 128 bytes. Supports id translation.
    pub title: String,
    /// Up to 512 bytes. Supports id translation.
    pub description: String,
    pub url: String,
    /// Button caption, "详情" when empty, at most 4 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub btntxt: String,
}

/// News message with 1 to 8 articles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub url: String,
    /// JPG or PNG; 1068x455 for the large picture, 150x150 for the small one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub picurl: String,
}

/// Rich news (`mpnews`): like [`News`] but the article body is stored by the
/// service. Every send counts as a distinct article for read statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpNews {
    pub articles: Vec<MpNewsArticle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpNewsArticle {
    pub title: String,
    /// `media_id` of an uploaded thumbnail.
    pub thumb_media_id: String,
    /// Up to 64 bytes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Target of "read more".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_source_url: String,
    /// HTML allowed, up to 666 KB.
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub digest: String,
}

/// Markdown message, UTF-8, up to 2048 bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markdown {
    pub content: String,
}

/// Mini-program notice. Only mini-program applications may send it, and
/// `@all` is not accepted as a receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniProgram {
    /// Must be a mini program bound to the sending application.
    pub appid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub page: String,
    /// 4 to 12 characters.
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub emphasis_first_item: bool,
    /// At most 10 items.
    #[serde(rename = "content_item", default, skip_serializing_if = "Vec::is_empty")]
    pub content_items: Vec<MiniProgramContentItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniProgramContentItem {
    pub key: String,
    pub value: String,
}

/// Task card message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCard {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Unique per application; digits, letters and `_-@.`, up to 128 bytes.
    pub task_id: String,
    /// One or two buttons.
    #[serde(rename = "btn")]
    pub buttons: Vec<TaskCardButton>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCardButton {
    /// Echoed back in the task card callback event.
    pub key: String,
    pub name: String,
    /// Caption after the button was clicked, "已处理" when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub replace_name: String,
    /// "red" or "blue".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default)]
    pub is_bold: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}
