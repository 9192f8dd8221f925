//! Recipe suggestion generation.
//!
//! [`SuggestionGenerator`] builds the prompt, calls a [`TextGenerator`]
//! (Gemini in production), and parses the reply with [`parse`]. Upstream
//! failures and unparseable replies are both retried after a fixed delay,
//! up to [`MAX_ATTEMPTS`] in total. A batch either succeeds whole or fails.

pub mod gemini;
pub mod parse;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiClient, GeminiError};
pub use parse::MalformedResponse;

/// Number of recipes requested per batch.
pub const RECIPE_COUNT: usize = 5;

/// Total generation attempts before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

/// Why a single generation attempt failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Network error or non-success status from the text service.
    #[error("text service unavailable: {0}")]
    Unavailable(String),

    /// The text service answered but the reply was not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(#[from] MalformedResponse),

    /// Called without any ingredients.
    #[error("no ingredients supplied")]
    EmptyInput,
}

/// Terminal failure after the retry budget is spent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("recipe generation failed after {attempts} attempts: {last}")]
pub struct GenerationFailed {
    pub attempts: u32,
    pub last: GenerationError,
}

/// One generated recipe before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRecipe {
    pub title: String,
    pub markdown: String,
}

/// A generative text service: prompt in, raw text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Produces a batch of recipe suggestions for a list of ingredients.
#[derive(Clone)]
pub struct SuggestionGenerator {
    text: Arc<dyn TextGenerator>,
    retry_delay: Duration,
}

impl SuggestionGenerator {
    #[must_use]
    pub fn new(text: Arc<dyn TextGenerator>, retry_delay: Duration) -> Self {
        Self { text, retry_delay }
    }

    /// Generate up to [`RECIPE_COUNT`] recipes, in the order the service emitted them.
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailed` once [`MAX_ATTEMPTS`] attempts have failed,
    /// or immediately if `ingredients` is empty.
    #[tracing::instrument(skip(self, ingredients), fields(ingredients = ingredients.len()))]
    pub async fn suggest(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<GeneratedRecipe>, GenerationFailed> {
        if ingredients.is_empty() {
            return Err(GenerationFailed {
                attempts: 0,
                last: GenerationError::EmptyInput,
            });
        }

        let prompt = build_prompt(ingredients);
        let mut attempt = 1;

        loop {
            match self.attempt(&prompt).await {
                Ok(recipes) => {
                    tracing::info!(attempt, recipes = recipes.len(), "Generated recipes");
                    return Ok(recipes);
                }
                Err(error) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(attempt, error = %error, "Recipe generation attempt failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(attempt, error = %error, "Recipe generation failed");
                    return Err(GenerationFailed {
                        attempts: attempt,
                        last: error,
                    });
                }
            }
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<Vec<GeneratedRecipe>, GenerationError> {
        let text = self.text.generate(prompt).await?;
        let mut recipes = parse::parse_recipes(&text)?;

        if recipes.len() > RECIPE_COUNT {
            tracing::warn!(
                received = recipes.len(),
                "Text service returned extra recipes, keeping the first {RECIPE_COUNT}"
            );
            recipes.truncate(RECIPE_COUNT);
        } else if recipes.len() < RECIPE_COUNT {
            tracing::warn!(received = recipes.len(), "Text service returned fewer recipes than requested");
        }

        Ok(recipes)
    }
}

/// Build the generation prompt for a list of ingredients.
#[must_use]
pub fn build_prompt(ingredients: &[String]) -> String {
    format!(
        r##"I have these ingredients in my pantry: {ingredients}.
Suggest exactly {RECIPE_COUNT} recipes that use mainly these ingredients.
Assume basic staples such as salt, pepper, oil and water are available.

Reply with a single JSON object and nothing else. Each key is a recipe name and
each value is the full recipe as a markdown string, for example:
{{
  "Recipe Name": "# Recipe Name\n\n## Ingredients\n- 1 cup ingredient\n\n## Instructions\n1. Step one\n\n## Cooking Time\n30 minutes\n\n## Difficulty\nEasy"
}}

Every recipe must include:
- the recipe title as an h1 heading
- an ingredients list with quantities
- numbered step-by-step instructions
- the cooking time
- the difficulty level
- any useful cooking tips

The reply must be valid JSON, with newlines inside the markdown escaped as \n."##,
        ingredients = ingredients.join(", ")
    )
}
