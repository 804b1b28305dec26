//! Token issuance/verification and bearer enforcement for protected routes.

pub mod crypto;
pub mod token;

pub use crypto::SecretCipher;
pub use token::{TokenService, DEFAULT_TTL_SECS};

use crate::error::AppError;
use axum::http::{header, HeaderMap};
use serde_json::Value;

/// Enforce `Authorization: Bearer <token>`. A missing header and an invalid
/// token map to the two 401 bodies protected routes return; the verified
/// claims come back for the dispatcher to attach to the request context.
pub fn require_bearer(tokens: &TokenService, headers: &HeaderMap) -> Result<Value, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;
    let token = header.strip_prefix("Bearer ").unwrap_or_default();
    tokens
        .verify(token)
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))
}
