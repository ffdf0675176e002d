//! Error response handling for the OAuth endpoints.
//!
//! Implements `IntoResponse` for `AuthError` so handlers can return
//! `AuthResult<..>` and still produce RFC 6749 §5.2 error bodies.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

/// Value of the `WWW-Authenticate` header on 401 responses.
pub const WWW_AUTHENTICATE_BASIC: &str = r#"Basic realm="keyhole""#;

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let code = self.oauth_error_code();

        // Server-side failures never describe themselves to the caller
        let body = if self.is_server_error() {
            json!({ "error": code })
        } else {
            json!({ "error": code, "error_description": description(&self) })
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_BASIC),
            );
        }

        response
    }
}

/// Maps an error to its HTTP status.
fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::InvalidRequest { .. } | AuthError::UnsupportedTokenType { .. } => {
            StatusCode::BAD_REQUEST
        }
        AuthError::InvalidClient { .. } => StatusCode::UNAUTHORIZED,
        AuthError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Returns the caller-facing description for a client error.
fn description(error: &AuthError) -> String {
    match error {
        AuthError::InvalidRequest { message } => message.clone(),
        // Don't tell the caller which half of the credentials was wrong
        AuthError::InvalidClient { .. } => "Client authentication failed".to_string(),
        AuthError::UnsupportedTokenType { token_type } => {
            format!("Unsupported token_type_hint '{token_type}'")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_request_response() {
        let response = AuthError::invalid_request("Missing required 'token' parameter").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(body["error_description"], "Missing required 'token' parameter");
    }

    #[tokio::test]
    async fn test_invalid_client_response() {
        let response = AuthError::invalid_client("bad secret for client1").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            WWW_AUTHENTICATE_BASIC
        );

        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_client");
        assert_eq!(body["error_description"], "Client authentication failed");
    }

    #[tokio::test]
    async fn test_unsupported_token_type_response() {
        let response = AuthError::unsupported_token_type("id_token").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "unsupported_token_type");
    }

    #[tokio::test]
    async fn test_storage_error_hides_details() {
        let response = AuthError::storage("connection to 10.0.0.5 refused").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "server_error" }));
    }
}
