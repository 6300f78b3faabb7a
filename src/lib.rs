//! Authenticated file-storage gateway.
//!
//! Clients upload binary objects through an HTTP API; payloads land in the
//! object store, lightweight metadata lands in a key-value index, and a
//! background worker can post-process stored objects asynchronously.

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
