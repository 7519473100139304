//! Shared constants and invariants

pub const DEFAULT_API_BASE: &str = "https://qyapi.weixin.qq.com/cgi-bin";
pub const DEFAULT_CACHE_FILE_PATH: &str = ".notify";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

// API paths, relative to the api base
pub const PATH_GET_TOKEN: &str = "/gettoken";
pub const PATH_MESSAGE_SEND: &str = "/message/send";
pub const PATH_MEDIA_UPLOAD: &str = "/media/upload";

// access_token expired
pub const ERRCODE_TOKEN_EXPIRED: i64 = 42001;
// access_token invalid
pub const ERRCODE_TOKEN_INVALID: i64 = 40014;

/// Upper bound accepted by the API for `duplicate_check_interval` (4 hours).
pub const DUPLICATE_CHECK_INTERVAL_MAX_SECS: u32 = 4 * 60 * 60;

pub const MULTIPART_MEDIA_FIELD: &str = "media";
pub const TEMP_FILE_SUFFIX: &str = ".tmp";
