//! Authorization server metadata endpoint (RFC 8414).
//!
//! Serves `/.well-known/oauth-authorization-server` so resource servers can
//! find the introspection and revocation endpoints and learn how to
//! authenticate to them.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::http::{INTROSPECTION_PATH, REVOCATION_PATH};
use crate::oauth::TokenEndpointAuthMethod;

/// Authorization server metadata document.
///
/// # Example Response
///
/// ```json
/// {
///   "issuer": "https://auth.example.com",
///   "introspection_endpoint": "https://auth.example.com/oauth/introspect",
///   "introspection_endpoint_auth_methods_supported": ["client_secret_basic", "client_secret_post"],
///   "revocation_endpoint": "https://auth.example.com/oauth/revoke",
///   "revocation_endpoint_auth_methods_supported": ["client_secret_basic", "client_secret_post"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationServerMetadata {
    /// Issuer identifier.
    pub issuer: String,

    /// URL of the introspection endpoint.
    pub introspection_endpoint: String,

    /// Client authentication methods accepted by the introspection endpoint.
    pub introspection_endpoint_auth_methods_supported: Vec<TokenEndpointAuthMethod>,

    /// URL of the revocation endpoint.
    pub revocation_endpoint: String,

    /// Client authentication methods accepted by the revocation endpoint.
    pub revocation_endpoint_auth_methods_supported: Vec<TokenEndpointAuthMethod>,
}

impl AuthorizationServerMetadata {
    /// Builds the metadata document for an issuer.
    #[must_use]
    pub fn build(config: &AuthConfig, auth_methods: Vec<TokenEndpointAuthMethod>) -> Self {
        let base = config.issuer.trim_end_matches('/');

        Self {
            issuer: config.issuer.clone(),
            introspection_endpoint: format!("{base}{INTROSPECTION_PATH}"),
            introspection_endpoint_auth_methods_supported: auth_methods.clone(),
            revocation_endpoint: format!("{base}{REVOCATION_PATH}"),
            revocation_endpoint_auth_methods_supported: auth_methods,
        }
    }
}

/// State for the metadata endpoint. The document is built once at startup.
#[derive(Clone)]
pub struct DiscoveryState {
    /// Pre-built metadata document.
    pub metadata: AuthorizationServerMetadata,
}

impl DiscoveryState {
    /// Creates a new discovery state.
    pub fn new(config: &AuthConfig, auth_methods: Vec<TokenEndpointAuthMethod>) -> Self {
        Self {
            metadata: AuthorizationServerMetadata::build(config, auth_methods),
        }
    }
}

/// Handler for `GET /.well-known/oauth-authorization-server`.
pub async fn authorization_server_metadata_handler(
    State(state): State<DiscoveryState>,
) -> impl IntoResponse {
    Json(state.metadata)
}
