//! Token revocation (RFC 7009)
//!
//! # Security Considerations
//!
//! - Revocation endpoint returns 200 OK for any authenticated client, so the
//!   response never reveals whether a token existed
//! - Only the client a token was issued to may revoke it
//!
//! # References
//!
//! - [RFC 7009 - OAuth 2.0 Token Revocation](https://tools.ietf.org/html/rfc7009)

use serde::Deserialize;

use crate::types::TokenKind;

/// Token revocation request per RFC 7009.
#[derive(Debug, Clone, Deserialize)]
pub struct RevocationRequest {
    /// The token to revoke.
    pub token: String,

    /// Optional hint about the token type.
    #[serde(default)]
    pub token_type_hint: Option<TokenKind>,
}

impl RevocationRequest {
    /// Creates a request without a hint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type_hint: None,
        }
    }
}
