//! Integration test support for the pantry server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pantry-integration-tests
//! ```
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` on top
//! of the in-memory store, a scripted text generator and a table-driven
//! video finder. Upstream HTTP clients are tested against stub servers
//! bound to `127.0.0.1:0`.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use pantry_core::VideoMatch;
use pantry_server::db::InMemoryPantryStore;
use pantry_server::services::generation::{GenerationError, TextGenerator};
use pantry_server::services::VideoFinder;
use pantry_server::state::{AppState, StateOptions};

/// Admin token used by [`TestApp::with_admin_token`].
pub const ADMIN_TOKEN: &str = "q8Vn2Lk5Tz9Xw3Rb7Mc1Hs4Pd6Gj0Fy";

/// Replays scripted replies, then repeats the fallback forever.
pub struct ScriptedText {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Result<String, GenerationError>,
    calls: Mutex<usize>,
}

impl ScriptedText {
    #[must_use]
    pub fn always(reply: Result<String, GenerationError>) -> Self {
        Self::scripted(Vec::new(), reply)
    }

    #[must_use]
    pub fn scripted(
        script: Vec<Result<String, GenerationError>>,
        fallback: Result<String, GenerationError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Looks videos up in a fixed table, sleeping per entry before answering.
#[derive(Default)]
pub struct TableVideos {
    table: HashMap<String, (VideoMatch, Duration)>,
}

impl TableVideos {
    #[must_use]
    pub fn with(mut self, title: &str, video_id: &str, delay: Duration) -> Self {
        self.table.insert(
            title.to_string(),
            (
                VideoMatch {
                    video_id: video_id.to_string(),
                    title: format!("How to make {title}"),
                },
                delay,
            ),
        );
        self
    }
}

#[async_trait]
impl VideoFinder for TableVideos {
    async fn find_video(&self, recipe_title: &str) -> Option<VideoMatch> {
        let (video, delay) = self.table.get(recipe_title)?;
        tokio::time::sleep(*delay).await;
        Some(video.clone())
    }
}

/// An in-process pantry server.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryPantryStore>,
    pub text: Arc<ScriptedText>,
}

impl TestApp {
    #[must_use]
    pub fn new(text: ScriptedText, videos: TableVideos) -> Self {
        Self::build(text, videos, None)
    }

    #[must_use]
    pub fn with_admin_token(text: ScriptedText, videos: TableVideos) -> Self {
        Self::build(text, videos, Some(SecretString::from(ADMIN_TOKEN.to_string())))
    }

    fn build(text: ScriptedText, videos: TableVideos, admin_token: Option<SecretString>) -> Self {
        let store = Arc::new(InMemoryPantryStore::new());
        let text = Arc::new(text);
        let state = AppState::from_parts(
            store.clone(),
            text.clone(),
            Arc::new(videos),
            StateOptions {
                admin_token,
                retry_delay: Duration::ZERO,
                ..StateOptions::default()
            },
        );

        Self {
            router: pantry_server::app(state),
            store,
            text,
        }
    }

    /// Send a request and decode the JSON response body (`Null` if empty or not JSON).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, None).await
    }

    /// Add an item through the API and return its id.
    pub async fn add_item(&self, user_id: &str, name: &str) -> String {
        let (status, body) = self
            .post("/pantry", serde_json::json!({ "userId": user_id, "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_stub(router: Router) -> url::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    url::Url::parse(&format!("http://{addr}/")).unwrap()
}
