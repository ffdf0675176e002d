//! Token introspection and revocation.
//!
//! - [`introspection`] - RFC 7662 request/response types
//! - [`revocation`] - RFC 7009 request type
//! - [`service`] - the token service both endpoints delegate to

pub mod introspection;
pub mod revocation;
pub mod service;

pub use introspection::{IntrospectionRequest, IntrospectionResponse};
pub use revocation::RevocationRequest;
pub use service::TokenService;

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::TokenKind;

/// Parses a raw `token_type_hint` parameter.
///
/// Absent or empty hints yield `None`. Unknown hints are ignored unless
/// `strict` is set, in which case they fail with `unsupported_token_type`.
///
/// # Errors
///
/// Returns `AuthError::UnsupportedTokenType` for an unknown hint in strict mode.
pub fn parse_token_type_hint(hint: Option<&str>, strict: bool) -> AuthResult<Option<TokenKind>> {
    let Some(hint) = hint.filter(|h| !h.is_empty()) else {
        return Ok(None);
    };

    match TokenKind::from_hint(hint) {
        Some(kind) => Ok(Some(kind)),
        None if strict => Err(AuthError::unsupported_token_type(hint)),
        None => {
            tracing::debug!(hint, "Ignoring unknown token_type_hint");
            Ok(None)
        }
    }
}
