//! Pantry clear commands for operators.
//!
//! Runs directly against the database, so no admin token is involved.
//! Recipe caches live in the server process and expire on their own TTL.

use pantry_core::UserId;
use pantry_server::db::{PantryStore, PgPantryStore, RepositoryError, create_pool};
use thiserror::Error;

use super::{DATABASE_URL_VAR, database_url};

/// Errors that can occur while clearing.
#[derive(Debug, Error)]
pub enum ClearError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid user id: {0}")]
    InvalidUser(String),

    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

async fn store() -> Result<PgPantryStore, ClearError> {
    let database_url = database_url().ok_or(ClearError::MissingEnvVar(DATABASE_URL_VAR))?;
    Ok(PgPantryStore::new(create_pool(&database_url).await?))
}

/// Delete every item owned by `user`.
///
/// # Errors
///
/// Returns an error if the user id is invalid or the database is unreachable.
pub async fn for_user(user: &str) -> Result<u64, ClearError> {
    let user_id = UserId::parse(user).map_err(|e| ClearError::InvalidUser(e.to_string()))?;
    let store = store().await?;

    let removed = store.clear_for_user(&user_id).await?;
    store.pool().close().await;

    tracing::info!(user_id = %user_id, removed, "Cleared pantry for user");
    Ok(removed)
}

/// Delete every pantry item for every user.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn all() -> Result<u64, ClearError> {
    let store = store().await?;

    let removed = store.clear_all().await?;
    store.pool().close().await;

    tracing::warn!(removed, "Cleared all pantry items");
    Ok(removed)
}
