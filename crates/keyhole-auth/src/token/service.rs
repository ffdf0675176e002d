//! Token service for introspecting and revoking tokens.
//!
//! The service is the core of both endpoints. It never issues tokens and
//! never mutates a record except to mark it revoked.
//!
//! # Usage
//!
//! ```ignore
//! use keyhole_auth::token::{IntrospectionRequest, TokenService};
//!
//! let service = TokenService::new(token_store, policy, config);
//! let response = service.introspect(&IntrospectionRequest::new("abc123"), &client).await?;
//! ```

use std::sync::Arc;

use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::{AuditConfig, IntrospectionConfig};
use crate::error::AuthError;
use crate::oauth::AuthenticatedClient;
use crate::policy::IntrospectionPolicy;
use crate::storage::TokenStore;
use crate::token::introspection::{IntrospectionRequest, IntrospectionResponse};
use crate::token::revocation::RevocationRequest;
use crate::types::TokenRecord;

/// Tracing target for audit events.
pub const AUDIT_TARGET: &str = "keyhole::audit";

/// Token service backing the introspection and revocation endpoints.
pub struct TokenService {
    /// Token metadata store.
    token_store: Arc<dyn TokenStore>,

    /// Who may introspect what.
    policy: Arc<dyn IntrospectionPolicy>,

    /// Introspection behavior.
    config: IntrospectionConfig,

    /// Audit logging switches.
    audit: AuditConfig,
}

impl TokenService {
    /// Creates a new token service with default audit settings.
    #[must_use]
    pub fn new(
        token_store: Arc<dyn TokenStore>,
        policy: Arc<dyn IntrospectionPolicy>,
        config: IntrospectionConfig,
    ) -> Self {
        Self {
            token_store,
            policy,
            config,
            audit: AuditConfig::default(),
        }
    }

    /// Sets the audit configuration.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditConfig) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the introspection configuration.
    #[must_use]
    pub fn config(&self) -> &IntrospectionConfig {
        &self.config
    }

    /// Returns the audit configuration.
    #[must_use]
    pub fn audit(&self) -> &AuditConfig {
        &self.audit
    }

    /// Introspects a token on behalf of an authenticated client.
    ///
    /// # Returns
    ///
    /// `active: true` with the record's claims when the token exists, is
    /// neither expired, premature, nor revoked, and the policy lets `client`
    /// see it. Otherwise exactly `{"active": false}`.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the token is empty
    /// - `Storage` if the token store fails
    pub async fn introspect(
        &self,
        request: &IntrospectionRequest,
        client: &AuthenticatedClient,
    ) -> AuthResult<IntrospectionResponse> {
        if request.token.is_empty() {
            return Err(AuthError::invalid_request(
                "Missing required 'token' parameter",
            ));
        }

        let record = self
            .token_store
            .lookup(&request.token, request.token_type_hint)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "Token store lookup failed during introspection");
            })?;

        let response = match record {
            Some(record) if self.is_visible(&record, client) => {
                IntrospectionResponse::from_record(&record, self.config.include_extension_claims)
            }
            _ => IntrospectionResponse::inactive(),
        };

        if self.audit.log_introspection {
            tracing::info!(
                target: AUDIT_TARGET,
                event = "introspect",
                client_id = %client.client_id(),
                auth_method = %client.auth_method,
                hint = request.token_type_hint.map(|h| h.as_str()),
                active = response.active,
                "Token introspected"
            );
        }

        Ok(response)
    }

    /// Revokes a token on behalf of an authenticated client.
    ///
    /// Unknown tokens and tokens issued to another client are ignored, so
    /// the caller learns nothing from the outcome.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the token is empty
    /// - `Storage` if the token store fails
    pub async fn revoke(
        &self,
        request: &RevocationRequest,
        client: &AuthenticatedClient,
    ) -> AuthResult<()> {
        if request.token.is_empty() {
            return Err(AuthError::invalid_request(
                "Missing required 'token' parameter",
            ));
        }

        let record = self
            .token_store
            .lookup(&request.token, request.token_type_hint)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "Token store lookup failed during revocation");
            })?;

        let revoked = match record {
            Some(record) if record.is_owned_by(client.client_id()) => {
                self.token_store.revoke(&request.token, record.kind).await?
            }
            Some(_) => {
                tracing::debug!(
                    client_id = %client.client_id(),
                    "Revocation ignored: token belongs to another client"
                );
                false
            }
            None => false,
        };

        if self.audit.log_revocation {
            tracing::info!(
                target: AUDIT_TARGET,
                event = "revoke",
                client_id = %client.client_id(),
                revoked,
                "Token revocation processed"
            );
        }

        Ok(())
    }

    /// Returns `true` if the record is active now and visible to `client`.
    fn is_visible(&self, record: &TokenRecord, client: &AuthenticatedClient) -> bool {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let leeway = i64::try_from(self.config.expiry_leeway.as_secs()).unwrap_or(i64::MAX);

        if !record.is_active_at(now, leeway) {
            return false;
        }

        if !self.policy.may_introspect(&client.client, record) {
            tracing::debug!(
                client_id = %client.client_id(),
                policy = self.policy.name(),
                "Introspection denied by policy"
            );
            return false;
        }

        true
    }
}

// =============================================================================
// Tests
// =============================================================================
