//! # keyhole-auth
//!
//! OAuth 2.0 token introspection (RFC 7662) and revocation (RFC 7009).
//!
//! This crate provides:
//! - Client authentication for the protected resources that call the endpoints
//! - Pluggable introspection authorization policies
//! - A token service over an abstract token store
//! - Axum handlers for the introspection, revocation and metadata endpoints
//!
//! ## Modules
//!
//! - [`config`] - Introspection and audit configuration
//! - [`error`] - Error taxonomy and OAuth error codes
//! - [`types`] - Client and token record domain types
//! - [`storage`] - Storage traits for clients and tokens
//! - [`oauth`] - Client authentication and secret hashing
//! - [`policy`] - Who may introspect which tokens
//! - [`token`] - Introspection and revocation logic
//! - [`http`] - Axum HTTP handlers

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod policy;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuditConfig, AuthConfig, ConfigError, IntrospectionConfig, PolicyKind};
pub use error::AuthError;
pub use http::{
    DiscoveryState, IntrospectionState, authorization_server_metadata_handler,
    introspect_handler, revoke_handler,
};
pub use oauth::{
    AuthenticatedClient, ClientAuthenticator, ClientCredentials, StorageClientAuthenticator,
    TokenEndpointAuthMethod,
};
pub use policy::{IntrospectionPolicy, policy_for};
pub use storage::{ClientStorage, TokenStore};
pub use token::{IntrospectionRequest, IntrospectionResponse, RevocationRequest, TokenService};
pub use types::{Client, TokenKind, TokenRecord};

/// Type alias for authentication/introspection results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use keyhole_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::error::AuthError;
    pub use crate::oauth::{AuthenticatedClient, ClientAuthenticator, ClientCredentials};
    pub use crate::policy::IntrospectionPolicy;
    pub use crate::storage::{ClientStorage, TokenStore};
    pub use crate::token::{IntrospectionRequest, IntrospectionResponse, TokenService};
    pub use crate::types::{Client, TokenKind, TokenRecord};
}
