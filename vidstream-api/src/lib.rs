//! # Vidstream API Server Library
//!
//! This library provides the HTTP surface of the Vidstream backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Environment-driven configuration
//! - `cookies`: HttpOnly token cookie transport
//! - `error`: Error handling and the uniform response envelope
//! - `middleware`: The auth gate for protected routes
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
