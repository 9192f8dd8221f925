//! Business logic services.
//!
//! # Services
//!
//! - `pantry` - Validating gateway in front of the pantry store
//! - `generation` - Gemini-backed recipe generation with bounded retry
//! - `video` - YouTube tutorial lookup
//! - `recipes` - Generate-then-enrich pipeline
//! - `recipe_cache` - Per-user cache of the latest recipe batch

pub mod generation;
pub mod pantry;
pub mod recipe_cache;
pub mod recipes;
pub mod video;

pub use generation::{GeminiClient, GeminiError, SuggestionGenerator, TextGenerator};
pub use pantry::{CreateItemInput, PantryError, PantryGateway};
pub use recipe_cache::RecipeCache;
pub use recipes::{RecipeError, RecipeService};
pub use video::{VideoFinder, YouTubeClient, YouTubeError};
