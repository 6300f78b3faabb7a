//! HTTP handlers for authentication, file operations, and health probes.

pub mod auth_handlers;
pub mod file_handlers;
pub mod health_handlers;
