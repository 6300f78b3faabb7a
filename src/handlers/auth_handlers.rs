//! Authentication handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, state::AppState};

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// `POST /login` — exchange the configured credential pair for a token.
///
/// Exact match against the single configured pair; anything else is a 401.
/// No session store and no rate limiting.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.username != state.credentials.username || req.password != state.credentials.password {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let access_token = state.auth.issue_token(&req.username)?;
    Ok(Json(LoginResponse { access_token }))
}
