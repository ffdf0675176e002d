//! Storage traits for introspection data.
//!
//! This module defines the storage interfaces the endpoints depend on:
//!
//! - OAuth client lookups and secret verification
//! - Token metadata lookups and revocation
//!
//! # Implementations
//!
//! - `keyhole-db-memory` - in-memory storage backend

pub mod client;
pub mod token;

pub use client::ClientStorage;
pub use token::TokenStore;
