//! OAuth 2.0 client authentication.
//!
//! - [`client_auth`] - authenticating the caller of an endpoint
//! - [`secret`] - Argon2id client secret hashing

pub mod client_auth;
pub mod secret;

pub use client_auth::{
    AuthenticatedClient, ClientAuthenticator, ClientCredentials, StorageClientAuthenticator,
    TokenEndpointAuthMethod, authenticate_client, parse_basic_auth,
};
