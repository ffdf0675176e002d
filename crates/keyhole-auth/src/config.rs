//! Authentication and introspection configuration.
//!
//! This module provides the configuration types for the auth module:
//! the issuer identity, introspection behavior, and audit logging switches.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root authentication configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://auth.example.com"
///
/// [auth.introspection]
/// policy = "same_client"
/// include_extension_claims = true
/// expiry_leeway = "30s"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server issuer URL (advertised in authorization server metadata).
    pub issuer: String,

    /// Introspection endpoint configuration.
    pub introspection: IntrospectionConfig,

    /// Audit configuration.
    pub audit: AuditConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            introspection: IntrospectionConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

/// Which clients may introspect which tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Any authenticated client may introspect any token.
    #[default]
    AnyClient,
    /// A client may only introspect tokens issued to itself.
    SameClient,
    /// A client may introspect tokens issued to itself or tokens whose
    /// audience contains its client id (resource servers).
    SameClientOrAudience,
}

impl PolicyKind {
    /// Returns the configuration string for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnyClient => "any_client",
            Self::SameClient => "same_client",
            Self::SameClientOrAudience => "same_client_or_audience",
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Introspection endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntrospectionConfig {
    /// Authorization policy applied after a token is found and active.
    pub policy: PolicyKind,

    /// Include non-standard claims stored on the token record.
    pub include_extension_claims: bool,

    /// Allow public clients (client_id only, no secret) to call the endpoint.
    /// RFC 7662 expects protected resources to authenticate, so this is off
    /// by default.
    pub allow_public_clients: bool,

    /// Reject unknown `token_type_hint` values with `unsupported_token_type`
    /// instead of ignoring them.
    pub strict_token_type_hint: bool,

    /// Clock skew tolerated when comparing `exp` and `nbf` to the current time.
    #[serde(with = "humantime_serde")]
    pub expiry_leeway: Duration,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::AnyClient,
            include_extension_claims: false,
            allow_public_clients: false,
            strict_token_type_hint: false,
            expiry_leeway: Duration::ZERO,
        }
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Log every introspection call (client and outcome, never the token).
    pub log_introspection: bool,

    /// Log revocation calls.
    pub log_revocation: bool,

    /// Log failed client authentication attempts.
    pub log_failed_auth: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_introspection: true,
            log_revocation: true,
            log_failed_auth: true,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

/// Upper bound for `expiry_leeway`. Anything larger effectively disables expiry.
const MAX_EXPIRY_LEEWAY: Duration = Duration::from_secs(300);

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the issuer is empty, and
    /// `ConfigError::InvalidValue` if:
    /// - The issuer is not an absolute http(s) URL
    /// - The issuer carries a query or fragment (RFC 8414 §2)
    /// - `expiry_leeway` exceeds five minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::Missing("auth.issuer".to_string()));
        }

        let issuer = url::Url::parse(&self.issuer).map_err(|e| {
            ConfigError::InvalidValue(format!("issuer '{}' is not a URL: {}", self.issuer, e))
        })?;

        if !matches!(issuer.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(format!(
                "issuer scheme must be http or https, got '{}'",
                issuer.scheme()
            )));
        }

        if issuer.query().is_some() || issuer.fragment().is_some() {
            return Err(ConfigError::InvalidValue(
                "issuer must not contain a query or fragment".to_string(),
            ));
        }

        if self.introspection.expiry_leeway > MAX_EXPIRY_LEEWAY {
            return Err(ConfigError::InvalidValue(format!(
                "introspection.expiry_leeway must be <= {}s",
                MAX_EXPIRY_LEEWAY.as_secs()
            )));
        }

        Ok(())
    }
}
