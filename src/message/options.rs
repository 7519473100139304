use serde::{Deserialize, Serialize};

use crate::error::{NotifyError, Result};
use crate::utils::constants::DUPLICATE_CHECK_INTERVAL_MAX_SECS;

/// Per-send flags. Not every message type honours every flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageOptions {
    /// Confidential message: no forwarding, watermarked.
    pub safe: bool,
    /// Translate ids into names in supported fields.
    pub enable_id_trans: bool,
    /// Drop identical messages sent within `duplicate_check_interval`.
    pub enable_duplicate_check: bool,
    /// Seconds; 0 keeps the server default (1800). Only sent when the
    /// duplicate check is on.
    pub duplicate_check_interval: u32,
}

impl MessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn safe(mut self) -> Self {
        self.safe = true;
        self
    }

    pub fn id_trans(mut self) -> Self {
        self.enable_id_trans = true;
        self
    }

    pub fn duplicate_check(mut self, interval_secs: Option<u32>) -> Self {
        self.enable_duplicate_check = true;
        self.duplicate_check_interval = interval_secs.unwrap_or_default();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.enable_duplicate_check && self.duplicate_check_interval > DUPLICATE_CHECK_INTERVAL_MAX_SECS {
            return Err(NotifyError::InvalidOption(format!(
                "duplicate_check_interval {}s exceeds the {}s maximum",
                self.duplicate_check_interval, DUPLICATE_CHECK_INTERVAL_MAX_SECS
            )));
        }
        Ok(())
    }
}
