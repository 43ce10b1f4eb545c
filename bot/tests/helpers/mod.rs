//! Reusable test helpers for integration tests.
//!
//! Provides a fake Pexels API served by a real axum server on a random port,
//! plus builders for a workflow and dispatcher wired to it.
//!
//! ## Test Servers
//!
//! Use [`spawn_test_server()`] to serve any router; [`FakePexels::spawn()`]
//! wraps it with canned Pexels responses and records every request.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::task::JoinHandle;
use uuid::Uuid;

use pexels_bot::commands::Dispatcher;
use pexels_bot::config::Config;
use pexels_bot::credentials::MemoryCredentialStore;
use pexels_bot::gateway::rest::{GuildDirectory, HostError};
use pexels_bot::pexels::PexelsClient;
use pexels_bot::settings::{MemoryConfigStore, PageSizeSettings};
use pexels_bot::workflow::ImageFetchWorkflow;

/// API key the fake server accepts.
pub const TEST_TOKEN: &str = "test-pexels-key";

// ============================================================================
// Test Server
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}

// ============================================================================
// Fake Pexels API
// ============================================================================

/// Canned Pexels data.
#[derive(Default)]
pub struct FakePexelsData {
    /// Photo ID → large image URL.
    pub photos: HashMap<u64, String>,
    /// IDs returned by `/v1/curated`, truncated to `per_page`.
    pub curated: Vec<u64>,
    /// Query → IDs returned by `/v1/search`.
    pub search: HashMap<String, Vec<u64>>,
    /// Photo IDs whose detail request fails with 500.
    pub failing: Vec<u64>,
}

/// Shared state of a running fake.
pub struct FakePexelsState {
    pub data: FakePexelsData,
    /// Every request path and query, in arrival order.
    pub requests: Mutex<Vec<String>>,
}

/// Handle to a running fake Pexels API.
pub struct FakePexels {
    pub server: TestServer,
    pub state: Arc<FakePexelsState>,
}

/// Large image URL the fake serves for `id`.
pub fn large_url(id: u64) -> String {
    format!("https://images.pexels.com/photos/{id}/large.jpeg")
}

impl FakePexelsData {
    /// Photos `ids` with URLs from [`large_url`].
    pub fn with_photos(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            photos: ids.into_iter().map(|id| (id, large_url(id))).collect(),
            ..Self::default()
        }
    }
}

impl FakePexels {
    pub async fn spawn(data: FakePexelsData) -> Self {
        let state = Arc::new(FakePexelsState {
            data,
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/v1/photos/{id}", get(photo))
            .route("/v1/curated", get(curated))
            .route("/v1/search", get(search))
            .with_state(Arc::clone(&state));

        let server = spawn_test_server(router).await;
        Self { server, state }
    }

    /// Recorded requests.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Recorded requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.starts_with(prefix))
            .collect()
    }
}

fn record(state: &FakePexelsState, uri: &Uri) {
    let entry = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    state.requests.lock().unwrap().push(entry);
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(TEST_TOKEN)
}

fn per_page(query: &HashMap<String, String>) -> usize {
    query
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(15)
}

fn photo_list(ids: &[u64]) -> serde_json::Value {
    let photos: Vec<_> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({ "page": 1, "per_page": ids.len(), "photos": photos })
}

async fn photo(
    State(state): State<Arc<FakePexelsState>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    record(&state, &uri);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.data.failing.contains(&id) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match state.data.photos.get(&id) {
        Some(url) => Json(json!({
            "id": id,
            "photographer": "Test Photographer",
            "src": { "original": url, "large": url, "medium": url }
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn curated(
    State(state): State<Arc<FakePexelsState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    record(&state, &uri);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let n = per_page(&query).min(state.data.curated.len());
    Json(photo_list(&state.data.curated[..n])).into_response()
}

async fn search(
    State(state): State<Arc<FakePexelsState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    record(&state, &uri);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let term = query.get("query").cloned().unwrap_or_default();
    let ids = state.data.search.get(&term).cloned().unwrap_or_default();
    let n = per_page(&query).min(ids.len());
    Json(photo_list(&ids[..n])).into_response()
}

// ============================================================================
// Workflow & Dispatcher builders
// ============================================================================

/// Workflow wired to `base_url` with in-memory stores.
pub fn workflow(base_url: &str, token: Option<&str>) -> (ImageFetchWorkflow, Arc<MemoryConfigStore>) {
    let store = Arc::new(MemoryConfigStore::new());
    let credentials = match token {
        Some(t) => MemoryCredentialStore::with_pexels_token(t),
        None => MemoryCredentialStore::new(),
    };
    let pexels = PexelsClient::new(base_url, std::time::Duration::from_secs(5))
        .expect("Failed to build Pexels client");

    let workflow = ImageFetchWorkflow::new(
        PageSizeSettings::new(store.clone()),
        Arc::new(credentials),
        pexels,
    );
    (workflow, store)
}

/// Guild ownership from a fixed table.
#[derive(Default)]
pub struct StaticGuilds {
    pub owners: HashMap<Uuid, Uuid>,
}

#[async_trait]
impl GuildDirectory for StaticGuilds {
    async fn guild_owner(&self, guild_id: Uuid) -> Result<Uuid, HostError> {
        self.owners
            .get(&guild_id)
            .copied()
            .ok_or_else(|| HostError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: "Guild not found".into(),
            })
    }
}

/// Dispatcher over `workflow` with the given guild owners and bot owners.
pub fn dispatcher(workflow: ImageFetchWorkflow, guilds: StaticGuilds, bot_owners: Vec<Uuid>) -> Dispatcher {
    let mut config = Config::default_for_test();
    config.owner_ids = bot_owners;
    Dispatcher::new(workflow, Arc::new(guilds), &config)
}
