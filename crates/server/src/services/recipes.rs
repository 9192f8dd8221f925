//! Recipe assembly pipeline.
//!
//! 1. Load the user's pantry; an empty pantry short-circuits.
//! 2. Generate a batch of recipes from the item names.
//! 3. Look up a tutorial video for every recipe concurrently.
//! 4. Number the recipes by position and cache the batch.

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, instrument};

use pantry_core::{RecipeSuggestion, UserId};

use crate::db::{PantryStore, RepositoryError};
use crate::services::generation::{GenerationFailed, SuggestionGenerator};
use crate::services::recipe_cache::{RecipeBatch, RecipeCache};
use crate::services::video::VideoFinder;

/// Errors returned by the recipe pipeline.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The `uid` query parameter was missing or invalid.
    #[error("{0}")]
    BadRequest(String),

    /// The user has no pantry items to cook with.
    #[error("No pantry items found. Add some ingredients to your pantry first.")]
    NoIngredients,

    /// No cached recipe with that id for this user.
    #[error("Recipe not found")]
    NotFound,

    /// Generation failed after all retries.
    #[error(transparent)]
    Generation(#[from] GenerationFailed),

    /// Storage backend failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A failure reported by a concurrent request's shared generation.
    #[error("{0}")]
    Internal(String),
}

/// Runs the generate-then-enrich pipeline and owns the recipe cache.
#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn PantryStore>,
    generator: SuggestionGenerator,
    videos: Arc<dyn VideoFinder>,
    cache: RecipeCache,
}

impl RecipeService {
    #[must_use]
    pub fn new(
        store: Arc<dyn PantryStore>,
        generator: SuggestionGenerator,
        videos: Arc<dyn VideoFinder>,
        cache: RecipeCache,
    ) -> Self {
        Self {
            store,
            generator,
            videos,
            cache,
        }
    }

    /// Recipes for a user, served from cache unless `refresh` is set.
    ///
    /// Concurrent misses for the same user share one generation.
    ///
    /// # Errors
    ///
    /// See [`RecipeService::assemble`].
    #[instrument(skip(self))]
    pub async fn recipes_for(
        &self,
        uid: Option<&str>,
        refresh: bool,
    ) -> Result<RecipeBatch, RecipeError> {
        let user_id = require_uid(uid)?;

        if refresh {
            // Never joins an in-flight generation that started before the refresh
            self.cache.invalidate(&user_id).await;
            let started = self.cache.begin();
            let recipes = self.assemble(&user_id).await?;
            return Ok(self.cache.insert(user_id, started, recipes).await);
        }

        self.cache
            .get_or_try_insert_with(&user_id, self.assemble(&user_id))
            .await
            .map_err(unshare)
    }

    /// One recipe from the user's most recent batch.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a missing `uid` and `NotFound` when the
    /// user has no cached batch or the batch has no recipe with that id.
    #[instrument(skip(self))]
    pub async fn cached_recipe(
        &self,
        uid: Option<&str>,
        id: &str,
    ) -> Result<RecipeSuggestion, RecipeError> {
        let user_id = require_uid(uid)?;
        let batch = self
            .cache
            .get(&user_id)
            .await
            .ok_or(RecipeError::NotFound)?;

        batch
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned()
            .ok_or(RecipeError::NotFound)
    }

    /// Build a fresh batch for `user_id` without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns `NoIngredients` for an empty pantry, `Generation` when every
    /// attempt failed, and `Repository` if the pantry cannot be read.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn assemble(&self, user_id: &UserId) -> Result<Vec<RecipeSuggestion>, RecipeError> {
        let items = self.store.list(user_id).await?;
        if items.is_empty() {
            return Err(RecipeError::NoIngredients);
        }

        let ingredients: Vec<String> = items
            .into_iter()
            .map(|item| item.name.into_inner())
            .collect();

        let generated = self.generator.suggest(&ingredients).await?;

        let videos = join_all(
            generated
                .iter()
                .map(|recipe| self.videos.find_video(&recipe.title)),
        )
        .await;

        let recipes: Vec<RecipeSuggestion> = generated
            .into_iter()
            .zip(videos)
            .enumerate()
            .map(|(position, (recipe, video))| {
                RecipeSuggestion::new(position, recipe.title, recipe.markdown, video)
            })
            .collect();

        info!(
            recipes = recipes.len(),
            with_video = recipes.iter().filter(|r| r.video_id.is_some()).count(),
            "Assembled recipe suggestions"
        );
        Ok(recipes)
    }
}

/// Take back ownership of an error shared by coalesced requests.
fn unshare(err: Arc<RecipeError>) -> RecipeError {
    Arc::try_unwrap(err).unwrap_or_else(|shared| match shared.as_ref() {
        RecipeError::NoIngredients => RecipeError::NoIngredients,
        RecipeError::Generation(failed) => RecipeError::Generation(failed.clone()),
        other => RecipeError::Internal(other.to_string()),
    })
}

fn require_uid(raw: Option<&str>) -> Result<UserId, RecipeError> {
    raw.and_then(|s| UserId::parse(s).ok())
        .ok_or_else(|| RecipeError::BadRequest("Missing uid".into()))
}
