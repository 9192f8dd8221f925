//! Bearer token check for operator-only endpoints.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use crate::error::AppError;

/// Require `Authorization: Bearer <token>` matching the configured admin token.
///
/// # Errors
///
/// Returns `Forbidden` when no admin token is configured, the header is
/// missing, or the token does not match.
pub fn require_admin(headers: &HeaderMap, expected: Option<&SecretString>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Err(AppError::Forbidden(
            "Clearing all pantries is disabled".to_string(),
        ));
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if constant_time_compare(token, expected.expose_secret()) => Ok(()),
        _ => {
            tracing::warn!("Rejected admin request with missing or invalid token");
            Err(AppError::Forbidden("Admin token required".to_string()))
        }
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
