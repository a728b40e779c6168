//! # Vidstream Shared Library
//!
//! This crate contains the domain types and business logic shared by the
//! Vidstream API server and its tests.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing and JWT token issuance
//! - `models`: User and channel data structures
//! - `store`: Credential store abstraction (Postgres and in-memory)
//! - `session`: The login/logout/refresh session lifecycle

pub mod auth;
pub mod models;
pub mod session;
pub mod store;

/// Current version of the Vidstream shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
