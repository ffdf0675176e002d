//! In-memory client storage.

use async_trait::async_trait;
use dashmap::DashMap;

use keyhole_auth::oauth::secret::verify_client_secret;
use keyhole_auth::{AuthError, AuthResult, Client, ClientStorage};

/// Client storage backed by a concurrent map keyed by `client_id`.
#[derive(Debug, Default)]
pub struct InMemoryClientStorage {
    clients: DashMap<String, Client>,
}

impl InMemoryClientStorage {
    /// Creates an empty client storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a client. `client.client_secret` must already be an
    /// Argon2 hash.
    pub fn insert(&self, client: Client) {
        self.clients.insert(client.client_id.clone(), client);
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no clients are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        // Clone the hash out so no map guard is held across Argon2
        let Some(hash) = self
            .clients
            .get(client_id)
            .and_then(|entry| entry.client_secret.clone())
        else {
            return Ok(false);
        };

        verify_client_secret(secret, &hash).map_err(|e| {
            tracing::error!(client_id, error = %e, "Stored client secret hash is malformed");
            AuthError::storage(format!("Malformed secret hash for client '{client_id}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyhole_auth::oauth::secret::hash_client_secret;

    fn storage() -> InMemoryClientStorage {
        let storage = InMemoryClientStorage::new();
        storage.insert(Client::confidential(
            "client1",
            hash_client_secret("secret1").unwrap(),
        ));
        storage.insert(Client::public("spa"));
        storage
    }

    #[tokio::test]
    async fn test_find_by_client_id() {
        let storage = storage();
        assert_eq!(storage.len(), 2);

        let client = storage.find_by_client_id("client1").await.unwrap().unwrap();
        assert!(client.confidential);
        assert!(storage.find_by_client_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_secret() {
        let storage = storage();
        assert!(storage.verify_secret("client1", "secret1").await.unwrap());
        assert!(!storage.verify_secret("client1", "wrong").await.unwrap());
        assert!(!storage.verify_secret("spa", "anything").await.unwrap());
        assert!(!storage.verify_secret("missing", "secret1").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_storage_error() {
        let storage = InMemoryClientStorage::new();
        storage.insert(Client::confidential("broken", "not-a-phc-string"));

        let result = storage.verify_secret("broken", "secret").await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }
}
