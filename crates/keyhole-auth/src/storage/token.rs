//! Token store trait.
//!
//! The token store is the system of record for issued tokens. The
//! introspection endpoint reads from it; the revocation endpoint marks
//! records revoked.
//!
//! # Security Considerations
//!
//! - Implementations should key records by `TokenRecord::hash_token`
//! - `find` returns records regardless of expiry/revocation; callers decide
//! - Concurrent readers of one token must see a consistent record

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{TokenKind, TokenRecord};

/// Storage trait for issued token metadata.
///
/// # Example Implementation
///
/// ```ignore
/// use keyhole_auth::storage::TokenStore;
/// use keyhole_auth::types::{TokenKind, TokenRecord};
/// use keyhole_auth::AuthResult;
///
/// struct SingleTokenStore(String, TokenRecord);
///
/// #[async_trait::async_trait]
/// impl TokenStore for SingleTokenStore {
///     async fn find(&self, token: &str, kind: TokenKind) -> AuthResult<Option<TokenRecord>> {
///         Ok((token == self.0 && kind == self.1.kind).then(|| self.1.clone()))
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Finds a token of exactly the given kind.
    ///
    /// # Returns
    ///
    /// Returns `Some(record)` if a token of that kind exists, including
    /// expired and revoked tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, token: &str, kind: TokenKind) -> AuthResult<Option<TokenRecord>>;

    /// Marks a token revoked.
    ///
    /// # Returns
    ///
    /// Returns `true` if a record was found and is now revoked, `false` if
    /// no record of that kind exists.
    ///
    /// # Idempotency
    ///
    /// Revoking an already-revoked token succeeds and keeps the original
    /// revocation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, token: &str, kind: TokenKind) -> AuthResult<bool>;

    /// Deletes records whose `exp` has passed.
    ///
    /// # Returns
    ///
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;

    /// Looks a token up using an optional type hint.
    ///
    /// The hinted kind is checked first and the other kind second, so a
    /// wrong hint never hides a token. Without a hint, access tokens are
    /// checked before refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if either underlying `find` fails.
    async fn lookup(
        &self,
        token: &str,
        hint: Option<TokenKind>,
    ) -> AuthResult<Option<TokenRecord>> {
        let first = hint.unwrap_or(TokenKind::AccessToken);

        if let Some(record) = self.find(token, first).await? {
            return Ok(Some(record));
        }

        self.find(token, first.other()).await
    }
}
