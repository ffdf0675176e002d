//! HTTP handlers for the OAuth 2.0 endpoints.
//!
//! # Available Handlers
//!
//! - [`introspect`] - Token introspection endpoint (RFC 7662)
//! - [`revoke`] - Token revocation endpoint (RFC 7009)
//! - [`discovery`] - Authorization server metadata (RFC 8414)
//!
//! Error bodies are produced by the `IntoResponse` impl in [`error`].

pub mod discovery;
pub mod error;
pub mod introspect;
pub mod revoke;

pub use discovery::{DiscoveryState, authorization_server_metadata_handler};
pub use introspect::{IntrospectionState, introspect_handler};
pub use revoke::revoke_handler;

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;

use crate::oauth::ClientCredentials;

/// Path of the introspection endpoint.
pub const INTROSPECTION_PATH: &str = "/oauth/introspect";

/// Path of the revocation endpoint.
pub const REVOCATION_PATH: &str = "/oauth/revoke";

/// Path of the authorization server metadata document.
pub const METADATA_PATH: &str = "/.well-known/oauth-authorization-server";

/// Marks a response as uncacheable (RFC 7662 §2.2, RFC 6749 §5.1).
pub(crate) fn no_store(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

/// Collects client credentials from the `Authorization` header and the
/// form body.
pub(crate) fn client_credentials(
    headers: &HeaderMap,
    client_id: Option<String>,
    client_secret: Option<String>,
) -> ClientCredentials {
    // A header that isn't visible ASCII still counts as sent
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    ClientCredentials::from_request_parts(authorization, client_id, client_secret)
}
