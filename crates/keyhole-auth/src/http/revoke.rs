//! Token revocation endpoint handler (RFC 7009).
//!
//! # Request Format
//!
//! ```text
//! POST /oauth/revoke
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <client_credentials>
//!
//! token=<token_to_revoke>&token_type_hint=refresh_token
//! ```
//!
//! # Response
//!
//! Per RFC 7009 §2.2, the endpoint returns 200 OK for an authenticated
//! client even when the token is unknown, already revoked, or belongs to
//! another client.

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::AuthResult;
use crate::http::introspect::{IntrospectionForm, IntrospectionState, accept_form};
use crate::http::{client_credentials, no_store};
use crate::token::RevocationRequest;

/// The revocation endpoint shares state with the introspection endpoint.
pub type RevocationState = IntrospectionState;

/// Token revocation endpoint handler.
///
/// - 200 OK: token revoked, or nothing to revoke
/// - 400 Bad Request: missing token parameter
/// - 401 Unauthorized: invalid client credentials
pub async fn revoke_handler(
    State(state): State<RevocationState>,
    headers: HeaderMap,
    form: Result<Form<IntrospectionForm>, FormRejection>,
) -> Response {
    no_store(revoke(&state, &headers, form).await.into_response())
}

async fn revoke(
    state: &RevocationState,
    headers: &HeaderMap,
    form: Result<Form<IntrospectionForm>, FormRejection>,
) -> AuthResult<StatusCode> {
    let form = accept_form(form)?;
    let token = form.require_token()?;

    let credentials =
        client_credentials(headers, form.client_id.clone(), form.client_secret.clone());
    let client = state.authenticate(&credentials, "revoke").await?;

    let hint = state.parse_hint(form.token_type_hint.as_deref())?;
    let request = RevocationRequest {
        token: token.to_string(),
        token_type_hint: hint,
    };

    state.token_service.revoke(&request, &client).await?;

    Ok(StatusCode::OK)
}
