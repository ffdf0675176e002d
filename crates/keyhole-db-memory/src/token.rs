//! In-memory token store.
//!
//! Records are keyed by `(kind, SHA-256(token))`; plaintext tokens are never
//! held by the store.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use keyhole_auth::{AuthResult, TokenKind, TokenRecord, TokenStore};

/// Token store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    records: DashMap<(TokenKind, String), TokenRecord>,
    /// Extra time an expired record is kept before cleanup removes it.
    grace_secs: i64,
}

impl InMemoryTokenStore {
    /// Creates an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps expired records for `grace` before cleanup removes them.
    ///
    /// Set this to the introspection expiry leeway so cleanup never deletes
    /// a record that introspection would still report active.
    #[must_use]
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_secs = i64::try_from(grace.as_secs()).unwrap_or(i64::MAX);
        self
    }

    /// Stores a record under the plaintext token. The record's `kind` picks
    /// the keyspace; an existing record with the same token and kind is
    /// replaced.
    pub fn insert(&self, token: &str, record: TokenRecord) {
        let key = (record.kind, TokenRecord::hash_token(token));
        self.records.insert(key, record);
    }

    /// Number of stored records of both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn find(&self, token: &str, kind: TokenKind) -> AuthResult<Option<TokenRecord>> {
        let key = (kind, TokenRecord::hash_token(token));
        Ok(self.records.get(&key).map(|entry| entry.value().clone()))
    }

    async fn revoke(&self, token: &str, kind: TokenKind) -> AuthResult<bool> {
        let key = (kind, TokenRecord::hash_token(token));
        match self.records.get_mut(&key) {
            Some(mut entry) => {
                entry.revoked_at.get_or_insert_with(OffsetDateTime::now_utc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let before = self.records.len();

        self.records
            .retain(|_, record| !record.is_expired_at(now, self.grace_secs));

        let removed = before.saturating_sub(self.records.len()) as u64;
        if removed > 0 {
            tracing::debug!(removed, "Removed expired token records");
        }
        Ok(removed)
    }
}
