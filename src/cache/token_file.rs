use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::cache::token::TokenState;
use crate::error::{NotifyError, Result};
use crate::utils::constants::TEMP_FILE_SUFFIX;

/// Durable home of a [`TokenState`].
///
/// Writes go to `<path>.tmp`, are fsynced, then renamed over `<path>`, so a
/// half-written record is never visible under the canonical path.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn temp_path(&self) -> PathBuf {
        let mut raw = self.path.clone().into_os_string();
        raw.push(TEMP_FILE_SUFFIX);
        PathBuf::from(raw)
    }

    /// Read and decode the record. Expiry is not checked here.
    pub async fn load(&self) -> Result<TokenState> {
        let raw = fs::read(&self.path)
            .await
            .map_err(|e| persistence("read cache file error", e))?;
        serde_json::from_slice::<TokenState>(&raw)
            .map_err(|e| persistence("unmarshal cache data error", e))
    }

    pub async fn save(&self, state: &TokenState) -> Result<()> {
        let raw = serde_json::to_vec(state).map_err(|e| persistence("marshal token state failed", e))?;
        let staged = self.stage(&raw).await?;
        staged.commit().await?;
        debug!("token cache: saved to {}", self.path.display());
        Ok(())
    }

    /// Write `raw` to the temp path and fsync it, without publishing it.
    pub(crate) async fn stage(&self, raw: &[u8]) -> Result<StagedFile> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence("create cache directory failed", e))?;
        }

        let staged = StagedFile {
            temp: self.temp_path(),
            target: self.path.clone(),
            committed: false,
        };

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&staged.temp)
            .await
            .map_err(|e| persistence("create temp file failed", e))?;
        file.write_all(raw)
            .await
            .map_err(|e| persistence("write to temp file failed", e))?;
        file.sync_all()
            .await
            .map_err(|e| persistence("sync temp file failed", e))?;
        drop(file);

        Ok(staged)
    }
}

/// A fully written temp file waiting to be renamed into place.
///
/// Dropping it without [`commit`](StagedFile::commit) removes the temp file.
#[derive(Debug)]
pub(crate) struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    pub(crate) fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub(crate) async fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp, &self.target)
            .await
            .map_err(|e| persistence("rename temp file failed", e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.temp);
        }
    }
}

fn persistence(context: &str, err: impl std::fmt::Display) -> NotifyError {
    NotifyError::Persistence(format!("{}: {}", context, err))
}
