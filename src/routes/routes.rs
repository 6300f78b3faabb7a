//! Defines routes for the file-storage gateway.
//!
//! ## Structure
//! - `POST /login`          — exchange credentials for a bearer token
//! - `POST /upload`         — upload a multipart file (bearer)
//! - `GET  /file/{id}`      — fetch file metadata (bearer)
//! - `GET  /download/{id}`  — download the payload (bearer)
//! - `GET  /healthz`        — liveness
//! - `GET  /readyz`         — readiness

use crate::{
    handlers::{
        auth_handlers::login,
        file_handlers::{download_file, get_file_metadata, upload_file},
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all gateway routes.
///
/// The router carries shared state (`AppState`) to all handlers; protected
/// handlers enforce the bearer token through the `AuthUser` extractor.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // authentication
        .route("/login", post(login))
        // file operations
        .route("/upload", post(upload_file))
        .route("/file/{id}", get(get_file_metadata))
        .route("/download/{id}", get(download_file))
}
