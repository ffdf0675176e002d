//! OAuth 2.0 Client domain type.
//!
//! Only the fields the introspection and revocation endpoints need are
//! modelled here; client registration lives outside this workspace.

use serde::{Deserialize, Serialize};

/// OAuth 2.0 client allowed to call the introspection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Argon2id-hashed client secret (PHC string) for confidential clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Human-readable display name.
    #[serde(default)]
    pub name: String,

    /// Whether this is a confidential client (has client secret).
    pub confidential: bool,

    /// Whether this client is currently active and can be used.
    pub active: bool,
}

impl Client {
    /// Creates an active confidential client with the given hashed secret.
    #[must_use]
    pub fn confidential(client_id: impl Into<String>, secret_hash: impl Into<String>) -> Self {
        let client_id = client_id.into();
        Self {
            name: client_id.clone(),
            client_id,
            client_secret: Some(secret_hash.into()),
            confidential: true,
            active: true,
        }
    }

    /// Creates an active public client (no secret).
    #[must_use]
    pub fn public(client_id: impl Into<String>) -> Self {
        let client_id = client_id.into();
        Self {
            name: client_id.clone(),
            client_id,
            client_secret: None,
            confidential: false,
            active: true,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the client inactive.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidential_client() {
        let client = Client::confidential("rs1", "$argon2id$hash");
        assert!(client.confidential);
        assert!(client.active);
        assert_eq!(client.name, "rs1");
        assert_eq!(client.client_secret.as_deref(), Some("$argon2id$hash"));
    }

    #[test]
    fn test_public_client_serialization_skips_secret() {
        let client = Client::public("spa").with_name("Single Page App");
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["clientId"], "spa");
        assert_eq!(json["name"], "Single Page App");
        assert!(json.get("clientSecret").is_none());
    }

    #[test]
    fn test_deactivated() {
        let client = Client::public("spa").deactivated();
        assert!(!client.active);
    }
}
