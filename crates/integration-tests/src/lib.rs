//! Integration tests for the Cafecraft client state layer.
//!
//! The remote API is faked with a real `axum` router bound to an ephemeral
//! local port - the adapter and stores are exercised over actual HTTP, the
//! same way the shells exercise them.
//!
//! # Test Categories
//!
//! - `api_adapter` - header attachment, 401 fast path, error-body mapping
//! - `site_store` - fetch/toggle flows and their loading/error discipline
//! - `plugin_gate` - end-to-end deny/notify/redirect and toggle-to-grant
//! - `public_catalog` - read-only fetchers and their caching
//! - `cart_persistence` - durable cart over file storage

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use parking_lot::Mutex;

use cafecraft_client::storage::MemoryStorage;
use cafecraft_client::ui::{Navigator, Notifier};
use cafecraft_client::{ApiClient, ClientConfig};

/// Navigator/notifier double that records every call for assertions.
#[derive(Default)]
pub struct Recorder {
    pub redirects: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<String>>,
}

impl Navigator for Recorder {
    fn redirect(&self, path: &str) {
        self.redirects.lock().push(path.to_string());
    }
}

impl Notifier for Recorder {
    fn notify(&self, _title: &str, message: &str) {
        self.notifications.lock().push(message.to_string());
    }
}

/// An `ApiClient` wired to a fake backend, with handles on its collaborators.
pub struct Harness {
    pub api: ApiClient,
    pub storage: Arc<MemoryStorage>,
    pub recorder: Arc<Recorder>,
}

impl Harness {
    /// Persist a signed-in session so subsequent requests carry a bearer
    /// token.
    pub fn sign_in(&self, token: &str) {
        self.api
            .credentials()
            .store_session(token, "refresh-token", &serde_json::json!({"phone": "0912"}))
            .unwrap();
    }
}

/// Initialize test logging once; respects `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Serve `routes` (addressed relative to `/api`) on an ephemeral local port
/// and return the base URL to point a client at.
pub async fn spawn_api(routes: Router) -> String {
    let app = Router::new().nest("/api", routes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Spin up a fake backend and a client stack against it.
pub async fn harness(routes: Router) -> Harness {
    init_tracing();
    let base_url = spawn_api(routes).await;
    let config = ClientConfig::with_base_url(&base_url).unwrap();

    let storage = Arc::new(MemoryStorage::new());
    let recorder = Arc::new(Recorder::default());
    let api = ApiClient::new(
        &config,
        Arc::clone(&storage) as Arc<dyn cafecraft_client::storage::StorageBackend>,
        Arc::clone(&recorder) as Arc<dyn Navigator>,
    );

    Harness {
        api,
        storage,
        recorder,
    }
}
