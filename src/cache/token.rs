use serde::{Deserialize, Serialize};

use crate::helpers::time::now_i64;

/// Access token handed out by the token manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: i64, // UNIX TIMESTAMP
}

impl Token {
    pub fn new(value: String, expires_at: i64) -> Self {
        Self { value, expires_at }
    }
}

/// Token record owned by the manager, and the on-disk shape of the cache file.
///
/// Only the token and its expiry live here; credentials are never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_expires_at: i64,
}

impl TokenState {
    pub fn new(access_token: String, token_expires_at: i64) -> Self {
        Self { access_token, token_expires_at }
    }

    /// Usable right now: non-empty and strictly before expiry.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_i64())
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && now < self.token_expires_at
    }

    pub fn token(&self) -> Token {
        Token::new(self.access_token.to_owned(), self.token_expires_at)
    }
}
