//! Gemini API client for recipe text generation.
//!
//! Calls `POST {base}/v1beta/models/{model}:generateContent` and returns the
//! text of the first candidate. The API key travels in the `x-goog-api-key`
//! header so it never appears in a logged URL.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::GeminiConfig;

use super::{GenerationError, MalformedResponse, TextGenerator};

/// Errors that can occur when talking to Gemini.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not a `generateContent` envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// The envelope had no candidate text.
    #[error("response contained no candidate text")]
    EmptyResponse,

    /// Client could not be built from configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<GeminiError> for GenerationError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Http(_) | GeminiError::Api { .. } | GeminiError::Config(_) => {
                Self::Unavailable(err.to_string())
            }
            GeminiError::Parse(message) => Self::Malformed(MalformedResponse::Envelope(message)),
            GeminiError::EmptyResponse => Self::Malformed(MalformedResponse::EmptyText),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::Config` if the API key is not a valid header
    /// value, the model name does not form a valid URL, or the HTTP client
    /// cannot be built.
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| GeminiError::Config("API key contains invalid characters".into()))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-goog-api-key", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeminiError::Config(format!("failed to build HTTP client: {e}")))?;

        let endpoint = config
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", config.model))
            .map_err(|e| GeminiError::Config(format!("invalid Gemini endpoint: {e}")))?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                endpoint,
                model: config.model.clone(),
            }),
        })
    }

    /// Send a prompt and return the first candidate's text.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, an
    /// undecodable envelope, or an envelope without text.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model))]
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::Parse(format!("Failed to parse response: {e}")))?;

        envelope.into_text().ok_or(GeminiError::EmptyResponse)
    }
}

fn api_error(status: StatusCode, body: &str) -> GeminiError {
    let message = serde_json::from_str::<ApiErrorResponse>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        },
        |e| e.error.message,
    );
    GeminiError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(self.generate_content(prompt).await?)
    }
}
