//! Introspection authorization policies.
//!
//! After a token is found and active, the endpoint asks an
//! [`IntrospectionPolicy`] whether the authenticated caller may see it.
//! A denial is reported to the caller exactly like an unknown token.

use std::sync::Arc;

use crate::config::PolicyKind;
use crate::types::{Client, TokenRecord};

/// Decides whether a client may introspect a token.
pub trait IntrospectionPolicy: Send + Sync {
    /// Returns `true` if `client` may learn the metadata of `record`.
    fn may_introspect(&self, client: &Client, record: &TokenRecord) -> bool;

    /// Short policy name for logs.
    fn name(&self) -> &'static str;
}

/// Any authenticated client may introspect any token.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyClientPolicy;

impl IntrospectionPolicy for AnyClientPolicy {
    fn may_introspect(&self, _client: &Client, _record: &TokenRecord) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "any_client"
    }
}

/// A client may only introspect tokens issued to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameClientPolicy;

impl IntrospectionPolicy for SameClientPolicy {
    fn may_introspect(&self, client: &Client, record: &TokenRecord) -> bool {
        record.is_owned_by(&client.client_id)
    }

    fn name(&self) -> &'static str {
        "same_client"
    }
}

/// A client may introspect tokens issued to itself, or tokens that name it
/// in their audience.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudiencePolicy;

impl IntrospectionPolicy for AudiencePolicy {
    fn may_introspect(&self, client: &Client, record: &TokenRecord) -> bool {
        record.is_owned_by(&client.client_id) || record.aud.iter().any(|a| *a == client.client_id)
    }

    fn name(&self) -> &'static str {
        "same_client_or_audience"
    }
}

/// Builds the policy selected in configuration.
#[must_use]
pub fn policy_for(kind: PolicyKind) -> Arc<dyn IntrospectionPolicy> {
    match kind {
        PolicyKind::AnyClient => Arc::new(AnyClientPolicy),
        PolicyKind::SameClient => Arc::new(SameClientPolicy),
        PolicyKind::SameClientOrAudience => Arc::new(AudiencePolicy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_for(client_id: &str) -> TokenRecord {
        TokenRecord::access_token()
            .with_client_id(client_id)
            .with_aud(vec!["orders-api".to_string()])
    }

    #[test]
    fn test_any_client_policy() {
        let policy = AnyClientPolicy;
        assert!(policy.may_introspect(&Client::public("other"), &token_for("client1")));
        assert!(policy.may_introspect(&Client::public("other"), &TokenRecord::access_token()));
    }

    #[test]
    fn test_same_client_policy() {
        let policy = SameClientPolicy;
        assert!(policy.may_introspect(&Client::public("client1"), &token_for("client1")));
        assert!(!policy.may_introspect(&Client::public("client2"), &token_for("client1")));
        // Tokens without a client_id belong to nobody
        assert!(!policy.may_introspect(&Client::public("client1"), &TokenRecord::access_token()));
    }

    #[test]
    fn test_audience_policy() {
        let policy = AudiencePolicy;
        assert!(policy.may_introspect(&Client::public("client1"), &token_for("client1")));
        assert!(policy.may_introspect(&Client::public("orders-api"), &token_for("client1")));
        assert!(!policy.may_introspect(&Client::public("billing-api"), &token_for("client1")));
    }

    #[test]
    fn test_policy_for_kind() {
        assert_eq!(policy_for(PolicyKind::AnyClient).name(), "any_client");
        assert_eq!(policy_for(PolicyKind::SameClient).name(), "same_client");
        assert_eq!(
            policy_for(PolicyKind::SameClientOrAudience).name(),
            "same_client_or_audience"
        );
    }
}
