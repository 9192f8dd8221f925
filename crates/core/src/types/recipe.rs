//! Recipe suggestion types.
//!
//! Suggestions are ephemeral: they are built per generation and never stored
//! in the database. The JSON field names match what pantry clients read.

use serde::{Deserialize, Serialize};

/// The single best video found for a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoMatch {
    pub video_id: String,
    pub title: String,
}

/// One generated candidate dish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeSuggestion {
    /// Zero-based position within the generated batch.
    pub id: String,
    pub title: String,
    /// Full recipe in markdown.
    #[serde(rename = "markdownRecipe")]
    pub markdown_body: String,
    #[serde(rename = "youtubeVideoId", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(rename = "youtubeVideoTitle", skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
}

impl RecipeSuggestion {
    /// Build the suggestion at `position`, attaching the video if one was found.
    #[must_use]
    pub fn new(
        position: usize,
        title: String,
        markdown_body: String,
        video: Option<VideoMatch>,
    ) -> Self {
        let (video_id, video_title) =
            video.map_or((None, None), |v| (Some(v.video_id), Some(v.title)));
        Self {
            id: position.to_string(),
            title,
            markdown_body,
            video_id,
            video_title,
        }
    }
}
