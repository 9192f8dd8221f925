//! Tutorial video lookup through the YouTube Data API.
//!
//! A lookup never fails the recipe it belongs to: any upstream problem is
//! logged and reported as "no video".

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use pantry_core::VideoMatch;

use crate::config::YouTubeConfig;

/// Appended to the recipe title to bias results toward cooking tutorials.
pub const QUERY_SUFFIX: &str = "recipe cooking tutorial";

/// Finds a tutorial video for a recipe title.
#[async_trait]
pub trait VideoFinder: Send + Sync {
    /// Best match for `recipe_title`, or `None` when nothing usable was found.
    async fn find_video(&self, recipe_title: &str) -> Option<VideoMatch>;
}

/// Errors that can occur when talking to YouTube.
#[derive(Debug, Error)]
pub enum YouTubeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// YouTube returned a non-success status.
    #[error("API error ({status})")]
    Api { status: u16 },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Client could not be built from configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
}

impl SearchResponse {
    fn into_first_match(self) -> Option<VideoMatch> {
        let item = self.items.into_iter().next()?;
        let video_id = item.id?.video_id.filter(|id| !id.is_empty())?;
        let title = item.snippet.and_then(|s| s.title).unwrap_or_default();
        Some(VideoMatch { video_id, title })
    }
}

/// YouTube Data API v3 search client.
#[derive(Clone)]
pub struct YouTubeClient {
    inner: Arc<YouTubeClientInner>,
}

struct YouTubeClientInner {
    client: reqwest::Client,
    search_url: Url,
}

impl YouTubeClient {
    /// Create a new YouTube client.
    ///
    /// # Errors
    ///
    /// Returns `YouTubeError::Config` if the API key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: &YouTubeConfig) -> Result<Self, YouTubeError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| YouTubeError::Config("API key contains invalid characters".into()))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| YouTubeError::Config(format!("failed to build HTTP client: {e}")))?;

        let search_url = config
            .base_url
            .join("youtube/v3/search")
            .map_err(|e| YouTubeError::Config(format!("invalid YouTube endpoint: {e}")))?;

        Ok(Self {
            inner: Arc::new(YouTubeClientInner { client, search_url }),
        })
    }

    /// Search for the single most relevant video for a recipe.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or an
    /// undecodable body.
    #[instrument(skip(self))]
    pub async fn search(&self, recipe_title: &str) -> Result<Option<VideoMatch>, YouTubeError> {
        let mut url = self.inner.search_url.clone();
        url.query_pairs_mut()
            .append_pair("part", "snippet")
            .append_pair("q", &format!("{recipe_title} {QUERY_SUFFIX}"))
            .append_pair("type", "video")
            .append_pair("maxResults", "1");

        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(YouTubeError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| YouTubeError::Parse(format!("Failed to parse response: {e}")))?;

        Ok(parsed.into_first_match())
    }
}

#[async_trait]
impl VideoFinder for YouTubeClient {
    async fn find_video(&self, recipe_title: &str) -> Option<VideoMatch> {
        match self.search(recipe_title).await {
            Ok(found) => {
                if found.is_none() {
                    tracing::debug!(recipe_title, "No tutorial video found");
                }
                found
            }
            Err(e) => {
                tracing::warn!(recipe_title, error = %e, "Video lookup failed, continuing without video");
                None
            }
        }
    }
}
