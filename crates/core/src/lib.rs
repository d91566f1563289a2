//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types shared by every Bazaar component:
//! - `server` - HTTP API (wishlists, sell requests, notifications, payments)
//! - `cli` - Command-line tools for migrations and operations
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain rules - no I/O, no
//! database access, no HTTP clients. The `postgres` feature adds `sqlx`
//! encode/decode impls so the server can bind these types directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, product identifiers, prices, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
