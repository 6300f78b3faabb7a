//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying the username. Protected handlers take the
//! [`AuthUser`] extractor, which only checks that a structurally valid token
//! was presented; there is no per-resource authorization.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, state::AppState};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl_secs: u64,
}

impl AuthKeys {
    /// Build keys from a shared secret. `token_ttl_secs` bounds how long an
    /// issued token stays valid.
    pub fn new(secret: &str, token_ttl_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl_secs,
        }
    }

    /// Issue a signed access token embedding `username`.
    pub fn issue_token(&self, username: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.token_ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            AppError::internal("Failed to generate token")
        })
    }

    /// Verify a token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                AppError::unauthorized("Invalid or expired token")
            })
    }
}

/// Extractor for authenticated requests.
///
/// Handlers taking this argument reject requests without a valid
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("Missing authorization"))?;

        let claims = state.auth.verify_token(token)?;
        Ok(AuthUser(claims))
    }
}
