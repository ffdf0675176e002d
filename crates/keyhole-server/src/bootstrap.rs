//! Seeds the in-memory stores from `[bootstrap]` configuration.
//!
//! Client secrets are hashed with Argon2 before they reach the store; the
//! plaintext only lives in the loaded configuration.

use keyhole_auth::oauth::secret::hash_client_secret;
use keyhole_auth::types::Client;
use keyhole_db_memory::{InMemoryClientStorage, InMemoryTokenStore};
use time::OffsetDateTime;
use tracing::info;

use crate::config::{BootstrapConfig, ClientSeed, TokenSeed};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to hash secret for client '{client_id}': {message}")]
    SecretHash { client_id: String, message: String },
}

/// Registers every configured client.
pub fn seed_clients(
    storage: &InMemoryClientStorage,
    seeds: &[ClientSeed],
) -> Result<usize, BootstrapError> {
    for seed in seeds {
        storage.insert(client_from_seed(seed)?);
    }
    if !seeds.is_empty() {
        info!(count = seeds.len(), "Bootstrap clients registered");
    }
    Ok(seeds.len())
}

/// Registers every configured token. `expires_in` is resolved against `now`.
pub fn seed_tokens(store: &InMemoryTokenStore, seeds: &[TokenSeed], now: OffsetDateTime) -> usize {
    for seed in seeds {
        let mut record = seed.record.clone();
        if let Some(expires_in) = seed.expires_in {
            let secs = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);
            record.exp = Some(now.unix_timestamp().saturating_add(secs));
        }
        store.insert(&seed.token, record);
    }
    if !seeds.is_empty() {
        info!(count = seeds.len(), "Bootstrap tokens registered");
    }
    seeds.len()
}

/// Seeds both stores.
pub fn seed_all(
    config: &BootstrapConfig,
    clients: &InMemoryClientStorage,
    tokens: &InMemoryTokenStore,
) -> Result<(), BootstrapError> {
    seed_clients(clients, &config.clients)?;
    seed_tokens(tokens, &config.tokens, OffsetDateTime::now_utc());
    Ok(())
}

fn client_from_seed(seed: &ClientSeed) -> Result<Client, BootstrapError> {
    let mut client = match &seed.client_secret {
        Some(secret) => {
            let hash = hash_client_secret(secret).map_err(|e| BootstrapError::SecretHash {
                client_id: seed.client_id.clone(),
                message: e.to_string(),
            })?;
            Client::confidential(&seed.client_id, hash)
        }
        None => Client::public(&seed.client_id),
    };
    if let Some(name) = &seed.name {
        client = client.with_name(name);
    }
    if !seed.active {
        client = client.deactivated();
    }
    Ok(client)
}
