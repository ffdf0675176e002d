//! Client secret hashing and verification.
//!
//! Client secrets are stored as Argon2id PHC strings, never plaintext.
//!
//! # Example
//!
//! ```
//! use keyhole_auth::oauth::secret::{hash_client_secret, verify_client_secret};
//!
//! let hash = hash_client_secret("s3cret").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//! assert!(verify_client_secret("s3cret", &hash).unwrap());
//! assert!(!verify_client_secret("other", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;

/// Hash checked when the presented client does not exist, so that unknown
/// and known client ids cost the same Argon2 work.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_client_secret("keyhole-unknown-client").ok());

/// Hash a client secret for storage using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_client_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a client secret against a stored Argon2 hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only if `hash` is not a valid
/// PHC string.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if the stored hash cannot be parsed.
pub fn verify_client_secret(secret: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(secret.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Runs a full Argon2 verification against a fixed hash and discards the
/// outcome.
pub fn verify_dummy_secret(secret: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_client_secret(secret, hash);
    }
}
