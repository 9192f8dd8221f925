//! Unified error handling for the pantry API.
//!
//! Every error renders as a JSON body `{"error": "..."}`. Generation
//! failures add a `details` field. Server-side failures are reported to
//! Sentry and never leak internals to the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::generation::GenerationFailed;
use crate::services::{PantryError, RecipeError};

/// Application-level error type for the pantry API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Recipe generation failed after all retries.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationFailed),

    /// The user has no pantry items.
    #[error("No pantry items found. Add some ingredients to your pantry first.")]
    NoIngredients,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller lacks permission.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Generation(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) | Self::NoIngredients => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Database(_) | Self::Internal(_) => ErrorBody {
                error: "Internal server error".to_string(),
                details: None,
            },
            Self::Generation(failed) => ErrorBody {
                error: "Failed to generate recipes".to_string(),
                details: Some(format!(
                    "Recipe generation failed after {} attempts",
                    failed.attempts
                )),
            },
            _ => ErrorBody {
                error: self.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PantryError> for AppError {
    fn from(err: PantryError) -> Self {
        match err {
            PantryError::BadRequest(message) => Self::BadRequest(message),
            PantryError::NotFound => Self::NotFound("Item not found".to_string()),
            PantryError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<RecipeError> for AppError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::BadRequest(message) => Self::BadRequest(message),
            RecipeError::NoIngredients => Self::NoIngredients,
            RecipeError::NotFound => Self::NotFound("Recipe not found".to_string()),
            RecipeError::Generation(e) => Self::Generation(e),
            RecipeError::Repository(e) => Self::Database(e),
            RecipeError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
