use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::client::Notifier;
use crate::error::{NotifyError, Result};
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK, OUTCOME_REMOTE_ERROR};
use crate::utils::constants::{MULTIPART_MEDIA_FIELD, PATH_MEDIA_UPLOAD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Voice,
    Video,
    File,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            MediaType::Image => "image",
            MediaType::Voice => "voice",
            MediaType::Video => "video",
            MediaType::File => "file",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local file to upload as temporary media (kept by the service for 3 days).
#[derive(Debug, Clone)]
pub struct UploadMedia {
    pub media_type: MediaType,
    pub path: PathBuf,
}

impl UploadMedia {
    pub fn new(media_type: MediaType, path: impl Into<PathBuf>) -> Self {
        Self { media_type, path: path.into() }
    }
}

/// Reply of `media/upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMediaResult {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub media_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub created_at: String,
}

impl UploadMediaResult {
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }
}

impl Notifier {
    /// Upload a temporary media file.
    ///
    /// Unlike [`send`](Notifier::send) there is no resend when the token is
    /// rejected; the reply is returned as decoded.
    pub async fn upload(&self, media: &UploadMedia) -> Result<UploadMediaResult> {
        let metrics = get_metrics().await;
        let uploaded = self.upload_inner(media).await;
        let outcome = match &uploaded {
            Ok(result) if result.is_ok() => OUTCOME_OK,
            Ok(_) => OUTCOME_REMOTE_ERROR,
            Err(_) => OUTCOME_ERROR,
        };
        metrics.media_uploads.with_label_values(&[media.media_type.as_str(), outcome]).inc();
        uploaded
    }

    async fn upload_inner(&self, media: &UploadMedia) -> Result<UploadMediaResult> {
        let content = fs::read(&media.path).await.map_err(|source| NotifyError::Io {
            context: "open media file error",
            path: media.path.clone(),
            source,
        })?;
        let file_name = media
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| MULTIPART_MEDIA_FIELD.to_owned());
        let size = content.len();

        let part = Part::bytes(content)
            .file_name(file_name.to_owned())
            .mime_str("application/octet-stream")
            .map_err(NotifyError::http("create multipart file error"))?;
        let form = Form::new().part(MULTIPART_MEDIA_FIELD, part);

        let token = self.tokens.get_token().await?;

        let url = format!("{}{}", self.tokens.api_base(), PATH_MEDIA_UPLOAD);
        let response = self
            .client
            .post(&url)
            .query(&[("access_token", token.value.as_str()), ("type", media.media_type.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(NotifyError::http("upload media file error"))?;
        let body = response
            .bytes()
            .await
            .map_err(NotifyError::http("upload media file error"))?;

        let result: UploadMediaResult =
            serde_json::from_slice(&body).map_err(NotifyError::decode("upload media result decode error"))?;
        if result.is_ok() {
            info!("upload media: '{}' ({} bytes) stored as {} '{}'", file_name, size, result.media_type, result.media_id);
        } else {
            warn!("upload media: '{}' rejected: {} {}", file_name, result.errcode, result.errmsg);
        }
        Ok(result)
    }
}

// created_at is documented as a string; numbers are accepted too
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
