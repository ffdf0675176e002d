//! In-memory storage backend for Keyhole.
//!
//! This crate provides in-memory implementations of the `ClientStorage` and
//! `TokenStore` traits from `keyhole-auth`, using `dashmap` for concurrent
//! access. Contents are lost on restart.
//!
//! # Example
//!
//! ```ignore
//! use keyhole_auth::TokenRecord;
//! use keyhole_db_memory::InMemoryTokenStore;
//!
//! let tokens = InMemoryTokenStore::new();
//! tokens.insert("abc123", TokenRecord::access_token().with_client_id("client1"));
//! ```

pub mod client;
pub mod token;

pub use client::InMemoryClientStorage;
pub use token::InMemoryTokenStore;
