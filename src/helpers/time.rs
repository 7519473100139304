use chrono::Utc;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

/// Absolute expiry for a token issued now with the given lifetime.
pub fn expires_at_from_ttl(expires_in: i64) -> i64 {
    now_i64().saturating_add(expires_in.max(0))
}
