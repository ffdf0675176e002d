//! Token record domain type.
//!
//! A `TokenRecord` is the metadata a token store keeps for an issued access
//! or refresh token. The introspection endpoint only ever reads records.
//!
//! # Security
//!
//! - Stores should key records by `TokenRecord::hash_token`, never plaintext
//! - Revocation is a timestamp; revoked records stay readable until cleanup

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

// =============================================================================
// Token Kind
// =============================================================================

/// The kind of an issued token.
///
/// Also used as the parsed form of the RFC 7662 / RFC 7009 `token_type_hint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// An access token.
    AccessToken,
    /// A refresh token.
    RefreshToken,
}

impl TokenKind {
    /// Returns the `token_type_hint` string for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Returns the other token kind.
    #[must_use]
    pub fn other(&self) -> Self {
        match self {
            Self::AccessToken => Self::RefreshToken,
            Self::RefreshToken => Self::AccessToken,
        }
    }

    /// Parses a `token_type_hint` value. Returns `None` for unknown hints.
    #[must_use]
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "access_token" => Some(Self::AccessToken),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Token Record
// =============================================================================

/// Metadata stored for an issued token.
///
/// All timestamps except `revoked_at` are Unix seconds, matching the
/// claims they are reported as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Whether this is an access or refresh token.
    pub kind: TokenKind,

    /// Space-separated granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Client the token was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Human-readable identifier of the resource owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Token type, e.g. "Bearer".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued-at time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not-before time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Subject identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Intended audiences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aud: Vec<String>,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Unique token identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// When this token was revoked (None = not revoked).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,

    /// Non-standard claims attached at issuance.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl TokenRecord {
    /// Creates an empty record of the given kind.
    #[must_use]
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            scope: None,
            client_id: None,
            username: None,
            token_type: None,
            exp: None,
            iat: None,
            nbf: None,
            sub: None,
            aud: Vec::new(),
            iss: None,
            jti: None,
            revoked_at: None,
            extensions: Map::new(),
        }
    }

    /// Creates an empty access token record.
    #[must_use]
    pub fn access_token() -> Self {
        Self::new(TokenKind::AccessToken)
    }

    /// Creates an empty refresh token record.
    #[must_use]
    pub fn refresh_token() -> Self {
        Self::new(TokenKind::RefreshToken)
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the client ID.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Sets the expiration time.
    #[must_use]
    pub fn with_exp(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Sets the issued-at time.
    #[must_use]
    pub fn with_iat(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Sets the not-before time.
    #[must_use]
    pub fn with_nbf(mut self, nbf: i64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the audience.
    #[must_use]
    pub fn with_aud(mut self, aud: Vec<String>) -> Self {
        self.aud = aud;
        self
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_iss(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Sets the token ID.
    #[must_use]
    pub fn with_jti(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Adds a non-standard claim.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    /// Marks the record revoked at the given instant.
    #[must_use]
    pub fn revoked(mut self, at: OffsetDateTime) -> Self {
        self.revoked_at = Some(at);
        self
    }

    /// Returns `true` if `exp` is at or before `now`, allowing `leeway_secs`.
    ///
    /// Records without `exp` never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: i64, leeway_secs: i64) -> bool {
        self.exp.is_some_and(|exp| now >= exp.saturating_add(leeway_secs))
    }

    /// Returns `true` if `nbf` is still in the future, allowing `leeway_secs`.
    #[must_use]
    pub fn is_premature_at(&self, now: i64, leeway_secs: i64) -> bool {
        self.nbf.is_some_and(|nbf| now.saturating_add(leeway_secs) < nbf)
    }

    /// Returns `true` if this token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the token is usable at `now`: not revoked, not
    /// expired, and not before its `nbf`.
    #[must_use]
    pub fn is_active_at(&self, now: i64, leeway_secs: i64) -> bool {
        !self.is_revoked()
            && !self.is_expired_at(now, leeway_secs)
            && !self.is_premature_at(now, leeway_secs)
    }

    /// Returns `true` if the token was issued to `client_id`.
    #[must_use]
    pub fn is_owned_by(&self, client_id: &str) -> bool {
        self.client_id.as_deref() == Some(client_id)
    }

    /// Hash a token value using SHA-256.
    ///
    /// Used both when storing records and when looking them up.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
