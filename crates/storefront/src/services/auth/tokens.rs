//! Bearer tokens for the mock login.
//!
//! Tokens are random 256-bit values, base64url-encoded, held in a `moka`
//! cache that expires them after the configured time-to-live.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;

use crate::models::CurrentUser;

/// Most concurrently valid tokens.
const MAX_TOKENS: u64 = 10_000;

/// A freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token to user mapping with expiry.
#[derive(Clone)]
pub struct TokenStore {
    cache: Cache<String, CurrentUser>,
    ttl: Duration,
}

impl TokenStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_TOKENS)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    /// Issue a new token for `user`.
    pub async fn issue(&self, user: CurrentUser) -> IssuedToken {
        let bytes: [u8; 32] = rand::random();
        let token = URL_SAFE_NO_PAD.encode(bytes);
        self.cache.insert(token.clone(), user).await;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(1));
        IssuedToken { token, expires_at }
    }

    /// The user a token belongs to, if it is still valid.
    pub async fn resolve(&self, token: &str) -> Option<CurrentUser> {
        self.cache.get(token).await
    }

    /// Invalidate a token. Unknown tokens are ignored.
    pub async fn revoke(&self, token: &str) {
        self.cache.invalidate(token).await;
    }
}
