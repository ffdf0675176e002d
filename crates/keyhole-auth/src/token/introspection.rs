//! Token introspection (RFC 7662)
//!
//! Request and response types for OAuth 2.0 Token Introspection, allowing
//! protected resources to check whether a token is active and read its
//! metadata.
//!
//! # Security Considerations
//!
//! - Introspection endpoint requires client authentication
//! - Never reveal why a token is inactive (expired vs revoked vs unknown vs
//!   not visible to this client)
//! - An inactive response carries `active` and nothing else
//!
//! # References
//!
//! - [RFC 7662 - OAuth 2.0 Token Introspection](https://tools.ietf.org/html/rfc7662)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{TokenKind, TokenRecord};

/// Claim names defined by RFC 7662 §2.2. Extension claims never override these.
pub const STANDARD_CLAIMS: [&str; 12] = [
    "active",
    "scope",
    "client_id",
    "username",
    "token_type",
    "exp",
    "iat",
    "nbf",
    "sub",
    "aud",
    "iss",
    "jti",
];

// =============================================================================
// Request Types
// =============================================================================

/// Token introspection request per RFC 7662.
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionRequest {
    /// The token to introspect.
    pub token: String,

    /// Optional hint about the token type.
    ///
    /// The server checks the hinted kind first and falls back to the other
    /// kind, so a wrong hint only costs an extra lookup.
    #[serde(default)]
    pub token_type_hint: Option<TokenKind>,
}

impl IntrospectionRequest {
    /// Creates a request without a hint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type_hint: None,
        }
    }

    /// Sets the token type hint.
    #[must_use]
    pub fn with_hint(mut self, hint: TokenKind) -> Self {
        self.token_type_hint = Some(hint);
        self
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Token introspection response per RFC 7662.
///
/// If the token is invalid, expired, revoked, unknown, or hidden from the
/// caller, the response only contains `active: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IntrospectionResponse {
    /// Whether the token is currently active. The only required field.
    pub active: bool,

    /// A space-separated list of scope values granted to the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Client identifier for the OAuth 2.0 client that requested this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Human-readable identifier for the resource owner who authorized this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Type of the token (e.g., "Bearer").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Expiration time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Subject identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Intended audience(s) for this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Vec<String>>,

    /// Issuer of the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Unique identifier for the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Extension claims, serialized at the top level next to the standard ones.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl IntrospectionResponse {
    /// Creates an inactive response (used for invalid/expired/revoked tokens).
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            active: false,
            ..Default::default()
        }
    }

    /// Creates an active response carrying exactly the claims present on
    /// `record`. Extension claims are copied only when `include_extensions`
    /// is set, and never shadow a standard claim.
    #[must_use]
    pub fn from_record(record: &TokenRecord, include_extensions: bool) -> Self {
        let extensions = if include_extensions {
            record
                .extensions
                .iter()
                .filter(|(name, _)| !STANDARD_CLAIMS.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        } else {
            Map::new()
        };

        Self {
            active: true,
            scope: record.scope.clone(),
            client_id: record.client_id.clone(),
            username: record.username.clone(),
            token_type: record.token_type.clone(),
            exp: record.exp,
            iat: record.iat,
            nbf: record.nbf,
            sub: record.sub.clone(),
            aud: (!record.aud.is_empty()).then(|| record.aud.clone()),
            iss: record.iss.clone(),
            jti: record.jti.clone(),
            extensions,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
