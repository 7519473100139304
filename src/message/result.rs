use serde::{Deserialize, Serialize};

use crate::message::receiver::split_list;
use crate::utils::constants::{ERRCODE_TOKEN_EXPIRED, ERRCODE_TOKEN_INVALID};

/// Reply of `message/send`.
///
/// Receivers outside the application's visibility are dropped and listed in
/// the `invalid*` fields while `errcode` may still be 0. When every receiver
/// is invalid the call fails with `errcode` 81013. User ids come back
/// lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(default)]
    pub invaliduser: String,
    #[serde(default)]
    pub invalidparty: String,
    #[serde(default)]
    pub invalidtag: String,
    #[serde(default)]
    pub msgid: String,
    /// Only set for messages that can be updated later, such as task cards.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_code: String,
}

impl MessageResult {
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }

    /// The API rejected the access token as expired or invalid.
    pub fn is_token_error(&self) -> bool {
        matches!(self.errcode, ERRCODE_TOKEN_EXPIRED | ERRCODE_TOKEN_INVALID)
    }

    pub fn invalid_users(&self) -> Vec<&str> {
        split_list(&self.invaliduser)
    }

    pub fn invalid_parties(&self) -> Vec<&str> {
        split_list(&self.invalidparty)
    }

    pub fn invalid_tags(&self) -> Vec<&str> {
        split_list(&self.invalidtag)
    }

    pub fn has_invalid_receivers(&self) -> bool {
        !(self.invaliduser.is_empty() && self.invalidparty.is_empty() && self.invalidtag.is_empty())
    }
}
