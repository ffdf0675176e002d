//! Token introspection endpoint handler (RFC 7662).
//!
//! # Usage
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use keyhole_auth::http::{IntrospectionState, introspect_handler};
//!
//! let app = Router::new()
//!     .route("/oauth/introspect", post(introspect_handler))
//!     .with_state(IntrospectionState::new(token_service, authenticator));
//! ```
//!
//! # Request Format
//!
//! ```text
//! POST /oauth/introspect
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <client_credentials>
//!
//! token=<token_to_introspect>&token_type_hint=access_token
//! ```
//!
//! # Security
//!
//! - Client authentication is required
//! - Never reveals why a token is inactive
//! - Responses are marked `no-store`

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::AuthResult;
use crate::error::AuthError;
use crate::http::{client_credentials, no_store};
use crate::oauth::{AuthenticatedClient, ClientAuthenticator, ClientCredentials};
use crate::token::service::AUDIT_TARGET;
use crate::token::{IntrospectionRequest, TokenService, parse_token_type_hint};
use crate::types::TokenKind;

// =============================================================================
// State Types
// =============================================================================

/// State shared by the introspection and revocation endpoints.
#[derive(Clone)]
pub struct IntrospectionState {
    /// Token service for performing introspection and revocation.
    pub token_service: Arc<TokenService>,
    /// Authenticates the calling client.
    pub authenticator: Arc<dyn ClientAuthenticator>,
}

impl IntrospectionState {
    /// Creates a new introspection state.
    pub fn new(
        token_service: Arc<TokenService>,
        authenticator: Arc<dyn ClientAuthenticator>,
    ) -> Self {
        Self {
            token_service,
            authenticator,
        }
    }

    /// Authenticates the caller, logging failures when auditing asks for it.
    pub(crate) async fn authenticate(
        &self,
        credentials: &ClientCredentials,
        endpoint: &'static str,
    ) -> AuthResult<AuthenticatedClient> {
        self.authenticator
            .authenticate(credentials)
            .await
            .inspect_err(|e| {
                if e.is_authentication_error() && self.token_service.audit().log_failed_auth {
                    tracing::warn!(
                        target: AUDIT_TARGET,
                        event = "client_auth_failed",
                        endpoint,
                        client_id = credentials.claimed_client_id().unwrap_or("-"),
                        basic = credentials.used_basic(),
                        error = %e,
                        "Client authentication failed"
                    );
                } else {
                    tracing::debug!(endpoint, error = %e, "Client authentication failed");
                }
            })
    }

    /// Parses a raw hint according to the configured strictness.
    pub(crate) fn parse_hint(&self, hint: Option<&str>) -> AuthResult<Option<TokenKind>> {
        parse_token_type_hint(hint, self.token_service.config().strict_token_type_hint)
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Form parameters for the introspection and revocation endpoints.
///
/// `token` is optional here so a missing parameter surfaces as
/// `invalid_request` instead of a form rejection.
#[derive(Debug, Default, Deserialize)]
pub struct IntrospectionForm {
    /// The token to introspect.
    #[serde(default)]
    pub token: Option<String>,

    /// Optional hint about the token type.
    #[serde(default)]
    pub token_type_hint: Option<String>,

    /// Client ID (for public clients or when not using Basic auth).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl IntrospectionForm {
    /// Returns the token parameter, failing if absent or empty.
    pub(crate) fn require_token(&self) -> AuthResult<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::invalid_request("Missing required 'token' parameter"))
    }
}

/// Unwraps the form extractor, mapping rejections to `invalid_request`.
pub(crate) fn accept_form(
    form: Result<Form<IntrospectionForm>, FormRejection>,
) -> AuthResult<IntrospectionForm> {
    form.map(|Form(form)| form).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        AuthError::invalid_request("Request body must be application/x-www-form-urlencoded")
    })
}

// =============================================================================
// Handler
// =============================================================================

/// Token introspection endpoint handler.
///
/// # Response
///
/// - 200 OK with JSON body: `{"active": true, ...claims}` or `{"active": false}`
/// - 400 Bad Request: missing token, malformed body, or (strict mode) unknown hint
/// - 401 Unauthorized: invalid client credentials
/// - 500 Internal Server Error: token store failure
pub async fn introspect_handler(
    State(state): State<IntrospectionState>,
    headers: HeaderMap,
    form: Result<Form<IntrospectionForm>, FormRejection>,
) -> Response {
    no_store(introspect(&state, &headers, form).await.into_response())
}

async fn introspect(
    state: &IntrospectionState,
    headers: &HeaderMap,
    form: Result<Form<IntrospectionForm>, FormRejection>,
) -> AuthResult<Response> {
    let form = accept_form(form)?;
    let token = form.require_token()?;

    let credentials =
        client_credentials(headers, form.client_id.clone(), form.client_secret.clone());
    let client = state.authenticate(&credentials, "introspect").await?;

    let hint = state.parse_hint(form.token_type_hint.as_deref())?;
    let request = IntrospectionRequest {
        token: token.to_string(),
        token_type_hint: hint,
    };

    let response = state.token_service.introspect(&request, &client).await?;

    tracing::debug!(active = response.active, "Token introspection completed");

    Ok(Json(response).into_response())
}
