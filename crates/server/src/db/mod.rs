//! Database operations for pantry `PostgreSQL`.
//!
//! # Database: `pantry`
//!
//! ## Tables
//!
//! - `pantry_item` - One row per ingredient, scoped by the external `user_id`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p pantry-cli -- migrate
//! ```
//!
//! Handlers never touch the pool directly. They go through the
//! [`PantryStore`] trait so tests can swap in [`InMemoryPantryStore`].

pub mod items;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pantry_core::{NewPantryItem, PantryItem, PantryItemId, UserId};

pub use items::PgPantryStore;
pub use memory::InMemoryPantryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Storage backend for pantry items.
#[async_trait]
pub trait PantryStore: Send + Sync {
    /// Items owned by `user_id`, newest `date_added` first.
    async fn list(&self, user_id: &UserId) -> Result<Vec<PantryItem>, RepositoryError>;

    /// Persist a new item and return the stored record.
    async fn create(&self, item: NewPantryItem) -> Result<PantryItem, RepositoryError>;

    /// Delete one item and return the removed record.
    ///
    /// Returns `RepositoryError::NotFound` if nothing matched.
    async fn delete(&self, id: PantryItemId) -> Result<PantryItem, RepositoryError>;

    /// Delete every item for every user. Returns the number removed.
    async fn clear_all(&self) -> Result<u64, RepositoryError>;

    /// Delete every item owned by `user_id`. Returns the number removed.
    async fn clear_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError>;

    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
