//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use sqlx::PgPool;

use crate::config::PantryConfig;
use crate::db::{PantryStore, PgPantryStore};
use crate::services::generation::SuggestionGenerator;
use crate::services::{
    GeminiClient, GeminiError, PantryGateway, RecipeCache, RecipeService, TextGenerator,
    VideoFinder, YouTubeClient, YouTubeError,
};

/// Error building application state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("gemini client: {0}")]
    Gemini(#[from] GeminiError),
    #[error("youtube client: {0}")]
    YouTube(#[from] YouTubeError),
}

/// Tunables that do not depend on the backing services.
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub admin_token: Option<SecretString>,
    pub recipe_cache_ttl: Duration,
    pub retry_delay: Duration,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            admin_token: None,
            recipe_cache_ttl: Duration::from_secs(1800),
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn PantryStore>,
    pantry: PantryGateway,
    recipes: RecipeService,
    admin_token: Option<SecretString>,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`, Gemini and YouTube.
    ///
    /// # Errors
    ///
    /// Returns an error if either upstream client cannot be built.
    pub fn new(config: &PantryConfig, pool: PgPool) -> Result<Self, StateError> {
        let gemini = GeminiClient::new(&config.gemini)?;
        let youtube = YouTubeClient::new(&config.youtube)?;

        Ok(Self::from_parts(
            Arc::new(PgPantryStore::new(pool)),
            Arc::new(gemini),
            Arc::new(youtube),
            StateOptions {
                admin_token: config.admin_token.clone(),
                recipe_cache_ttl: config.recipe_cache_ttl,
                retry_delay: config.gemini.retry_delay,
            },
        ))
    }

    /// Assemble state from explicit backends.
    #[must_use]
    pub fn from_parts(
        store: Arc<dyn PantryStore>,
        text: Arc<dyn TextGenerator>,
        videos: Arc<dyn VideoFinder>,
        options: StateOptions,
    ) -> Self {
        let cache = RecipeCache::new(options.recipe_cache_ttl);
        let pantry = PantryGateway::new(Arc::clone(&store), cache.clone());
        let recipes = RecipeService::new(
            Arc::clone(&store),
            SuggestionGenerator::new(text, options.retry_delay),
            videos,
            cache,
        );

        Self {
            inner: Arc::new(AppStateInner {
                store,
                pantry,
                recipes,
                admin_token: options.admin_token,
            }),
        }
    }

    /// Get a reference to the pantry store.
    #[must_use]
    pub fn store(&self) -> &dyn PantryStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the pantry gateway.
    #[must_use]
    pub fn pantry(&self) -> &PantryGateway {
        &self.inner.pantry
    }

    /// Get a reference to the recipe service.
    #[must_use]
    pub fn recipes(&self) -> &RecipeService {
        &self.inner.recipes
    }

    /// Token required for the global pantry clear, if enabled.
    #[must_use]
    pub fn admin_token(&self) -> Option<&SecretString> {
        self.inner.admin_token.as_ref()
    }
}
