//! Shared-secret authentication middleware
//!
//! Protected routes require an `x-api-key` header equal to the configured
//! secret. Both values are hashed with SHA-256 before comparison so that the
//! comparison time does not depend on where the strings first differ.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication middleware
///
/// Returns 401 Unauthorized if the key is missing or wrong. Applied to
/// protected routes only; `/health` is public.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // No configured secret disables auth checking
    let Some(secret) = state.api_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", API_KEY_HEADER)))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("Malformed {} header", API_KEY_HEADER)))?;

    if !keys_match(provided, secret) {
        warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return Err(ApiError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(next.run(request).await)
}

fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
