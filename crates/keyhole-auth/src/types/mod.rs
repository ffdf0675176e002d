//! Domain types for the auth module.

pub mod client;
pub mod token;

pub use client::Client;
pub use token::{TokenKind, TokenRecord};
