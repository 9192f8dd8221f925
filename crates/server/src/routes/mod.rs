//! HTTP route handlers for the pantry API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness check
//! GET    /health/ready          - Readiness check (pings the store)
//!
//! # Pantry
//! GET    /pantry?userId=        - List items
//! POST   /pantry                - Add item
//! DELETE /pantry?id=            - Delete item
//! DELETE /pantry/clear          - Clear items
//!
//! # Recipes
//! GET    /recipes?uid=          - Recipe suggestions
//! GET    /recipes/{id}?uid=     - Cached recipe detail
//! ```

pub mod health;
pub mod pantry;
pub mod recipes;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

/// Create the health probe router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create the pantry CRUD router.
pub fn pantry_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pantry",
            get(pantry::list).post(pantry::create).delete(pantry::delete),
        )
        .route("/pantry/clear", delete(pantry::clear))
}

/// Create the recipe suggestion router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(recipes::list))
        .route("/recipes/{id}", get(recipes::show))
}
