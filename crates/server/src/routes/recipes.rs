//! Recipe suggestion routes.
//!
//! ```text
//! GET /recipes?uid=[&refresh=true]  - Suggestions for the user's pantry
//! GET /recipes/{id}?uid=            - One recipe from the latest batch
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use pantry_core::RecipeSuggestion;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecipesQuery {
    pub uid: Option<String>,
    pub refresh: Option<String>,
}

impl RecipesQuery {
    fn refresh(&self) -> bool {
        self.refresh
            .as_deref()
            .is_some_and(|v| matches!(v, "1" | "true" | "yes"))
    }
}

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeSuggestion>,
}

/// Generate (or serve cached) suggestions for the user's pantry.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RecipesQuery>,
) -> Result<Json<RecipesResponse>, AppError> {
    let batch = state
        .recipes()
        .recipes_for(query.uid.as_deref(), query.refresh())
        .await?;
    Ok(Json(RecipesResponse {
        recipes: batch.as_ref().clone(),
    }))
}

/// One recipe from the user's most recent batch.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<RecipeSuggestion>, AppError> {
    let recipe = state
        .recipes()
        .cached_recipe(query.uid.as_deref(), &id)
        .await?;
    Ok(Json(recipe))
}
