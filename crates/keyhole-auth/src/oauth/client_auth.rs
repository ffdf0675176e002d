//! Client authentication for the introspection and revocation endpoints.
//!
//! RFC 7662 §2.1 requires the caller of the introspection endpoint to be
//! authorized; in practice that means the protected resource authenticates
//! as an OAuth client.
//!
//! # Authentication Methods
//!
//! - `client_secret_basic` - HTTP Basic Auth with client_id:client_secret
//! - `client_secret_post` - client_id and client_secret in request body
//! - `none` - public clients (client_id only), only when explicitly allowed
//!
//! # Authentication Priority
//!
//! 1. HTTP Basic Auth header
//! 2. client_secret_post (body parameters)
//! 3. Public client (client_id only)
//!
//! Hosts that authenticate clients some other way (mTLS, signed requests)
//! implement [`ClientAuthenticator`] themselves.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::secret::verify_dummy_secret;
use crate::storage::ClientStorage;
use crate::types::Client;

/// Result of successful client authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// The authenticated client.
    pub client: Client,

    /// The authentication method used.
    pub auth_method: TokenEndpointAuthMethod,
}

impl AuthenticatedClient {
    /// Returns the authenticated client's id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client.client_id
    }
}

/// Endpoint authentication methods (RFC 8414 `*_endpoint_auth_methods_supported`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// No client authentication (public clients).
    None,

    /// Client secret via HTTP Basic Auth.
    ClientSecretBasic,

    /// Client secret in request body.
    ClientSecretPost,
}

impl TokenEndpointAuthMethod {
    /// Returns the string representation of the auth method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
        }
    }
}

impl fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Client credentials collected from an HTTP request.
///
/// Secrets are plaintext here and must never be logged; the `Debug`
/// implementation redacts them.
#[derive(Clone, Default)]
pub struct ClientCredentials {
    /// Credentials from the `Authorization: Basic` header.
    pub basic: Option<(String, String)>,

    /// An `Authorization` header was sent but could not be read as Basic
    /// credentials.
    pub malformed_authorization: bool,

    /// `client_id` body parameter.
    pub client_id: Option<String>,

    /// `client_secret` body parameter.
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    /// Builds credentials from an optional `Authorization` header value and
    /// the body parameters.
    #[must_use]
    pub fn from_request_parts(
        authorization: Option<&str>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        let basic = authorization.and_then(parse_basic_auth);
        Self {
            malformed_authorization: authorization.is_some() && basic.is_none(),
            basic,
            client_id: client_id.filter(|id| !id.is_empty()),
            client_secret: client_secret.filter(|secret| !secret.is_empty()),
        }
    }

    /// Returns the client id the caller claims to be, if any.
    #[must_use]
    pub fn claimed_client_id(&self) -> Option<&str> {
        self.basic
            .as_ref()
            .map(|(id, _)| id.as_str())
            .or(self.client_id.as_deref())
    }

    /// Returns `true` if the credentials arrived in an `Authorization` header.
    #[must_use]
    pub fn used_basic(&self) -> bool {
        self.basic.is_some()
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("basic", &self.basic.as_ref().map(|(id, _)| (id, "[REDACTED]")))
            .field("malformed_authorization", &self.malformed_authorization)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// Authenticator
// =============================================================================

/// Pluggable client authentication capability.
///
/// The endpoints receive an `Arc<dyn ClientAuthenticator>` and only ever see
/// the post-authentication client identity.
#[async_trait]
pub trait ClientAuthenticator: Send + Sync {
    /// Authenticates the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidClient` if authentication fails,
    /// `AuthError::InvalidRequest` if the credentials are malformed, and
    /// storage errors unchanged.
    async fn authenticate(&self, credentials: &ClientCredentials)
    -> AuthResult<AuthenticatedClient>;

    /// Authentication methods this authenticator accepts.
    fn supported_methods(&self) -> Vec<TokenEndpointAuthMethod>;
}

/// Client authenticator backed by a [`ClientStorage`].
#[derive(Clone)]
pub struct StorageClientAuthenticator {
    client_storage: Arc<dyn ClientStorage>,
    allow_public_clients: bool,
}

impl StorageClientAuthenticator {
    /// Creates an authenticator that accepts confidential clients only.
    #[must_use]
    pub fn new(client_storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            client_storage,
            allow_public_clients: false,
        }
    }

    /// Sets whether public clients may authenticate with a bare `client_id`.
    #[must_use]
    pub fn with_public_clients(mut self, allow: bool) -> Self {
        self.allow_public_clients = allow;
        self
    }
}

#[async_trait]
impl ClientAuthenticator for StorageClientAuthenticator {
    async fn authenticate(
        &self,
        credentials: &ClientCredentials,
    ) -> AuthResult<AuthenticatedClient> {
        authenticate_client(
            credentials,
            self.client_storage.as_ref(),
            self.allow_public_clients,
        )
        .await
    }

    fn supported_methods(&self) -> Vec<TokenEndpointAuthMethod> {
        let mut methods = vec![
            TokenEndpointAuthMethod::ClientSecretBasic,
            TokenEndpointAuthMethod::ClientSecretPost,
        ];
        if self.allow_public_clients {
            methods.push(TokenEndpointAuthMethod::None);
        }
        methods
    }
}

/// Authenticates a client from request credentials.
///
/// Tries authentication methods in priority order.
///
/// # Errors
///
/// Returns an error if:
/// - Both Basic Auth and a body secret are present (RFC 6749 §2.3)
/// - The `Authorization` header is not valid Basic credentials
/// - No client credentials are provided
/// - The client is not found or inactive
/// - The client secret is invalid
/// - A public client presents a secret, or public clients are not allowed
pub async fn authenticate_client(
    credentials: &ClientCredentials,
    client_storage: &dyn ClientStorage,
    allow_public_clients: bool,
) -> AuthResult<AuthenticatedClient> {
    let has_body_credentials =
        credentials.client_id.is_some() || credentials.client_secret.is_some();

    if credentials.malformed_authorization {
        // Never fall back to body credentials when a header was sent
        if has_body_credentials {
            return Err(AuthError::invalid_request(
                "Multiple client authentication methods used",
            ));
        }
        return Err(AuthError::invalid_client("Malformed Authorization header"));
    }

    if credentials.basic.is_some() && credentials.client_secret.is_some() {
        return Err(AuthError::invalid_request(
            "Multiple client authentication methods used",
        ));
    }

    // 1. HTTP Basic Auth
    if let Some((client_id, client_secret)) = &credentials.basic {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretBasic,
            client_storage,
        )
        .await;
    }

    // 2. client_secret_post
    if let (Some(client_id), Some(client_secret)) =
        (&credentials.client_id, &credentials.client_secret)
    {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretPost,
            client_storage,
        )
        .await;
    }

    // 3. Public client (client_id only)
    if let Some(client_id) = &credentials.client_id {
        if !allow_public_clients {
            return Err(AuthError::invalid_client(
                "Client authentication required",
            ));
        }
        return authenticate_public(client_id, client_storage).await;
    }

    Err(AuthError::invalid_client("No client credentials provided"))
}

/// Authenticates a confidential client by secret.
///
/// # Errors
///
/// Returns an error if:
/// - The client is not found
/// - The client is not active
/// - The client is a public client
/// - The secret is incorrect
async fn authenticate_with_secret(
    client_id: &str,
    client_secret: &str,
    auth_method: TokenEndpointAuthMethod,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    let Some(client) = client_storage.find_by_client_id(client_id).await? else {
        verify_dummy_secret(client_secret);
        return Err(AuthError::invalid_client("Unknown client"));
    };

    if !client.active {
        verify_dummy_secret(client_secret);
        return Err(AuthError::invalid_client("Client is inactive"));
    }

    if !client.confidential {
        return Err(AuthError::invalid_client(format!(
            "Public clients cannot use {} authentication",
            auth_method
        )));
    }

    if !client_storage
        .verify_secret(client_id, client_secret)
        .await?
    {
        return Err(AuthError::invalid_client("Invalid client secret"));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method,
    })
}

/// Authenticates a public client (no secret required).
///
/// # Errors
///
/// Returns an error if:
/// - The client is not found
/// - The client is not active
/// - The client is confidential (must provide credentials)
async fn authenticate_public(
    client_id: &str,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    let client = client_storage
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

    if !client.active {
        return Err(AuthError::invalid_client("Client is inactive"));
    }

    if client.confidential {
        return Err(AuthError::invalid_client(
            "Confidential clients must provide client credentials",
        ));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method: TokenEndpointAuthMethod::None,
    })
}

/// Parses HTTP Basic Auth header value.
///
/// # Returns
///
/// Returns `Some((client_id, client_secret))` if valid, `None` otherwise.
///
/// # Example
///
/// ```
/// use keyhole_auth::oauth::client_auth::parse_basic_auth;
///
/// let (id, secret) = parse_basic_auth("Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ=").unwrap();
/// assert_eq!(id, "client_id");
/// assert_eq!(secret, "client_secret");
/// ```
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let encoded = header_value.trim().strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Split on first colon (secret may contain colons)
    let (client_id, client_secret) = credentials.split_once(':')?;
    if client_id.is_empty() {
        return None;
    }

    Some((client_id.to_string(), client_secret.to_string()))
}
