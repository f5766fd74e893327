//! Integration tests for the Mebel storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mebel-integration-tests
//! ```
//!
//! Each [`TestContext`] starts the full storefront router on an ephemeral
//! port, reading the bundled `db.json` and storing visitor data in a
//! temporary directory. Every [`TestContext::visitor`] client has its own
//! cookie jar, so each one is a separate visitor.

#![allow(clippy::missing_panics_doc)]

use std::path::PathBuf;

use mebel_storefront::catalogue::CatalogueSource;
use mebel_storefront::config::StorefrontConfig;
use mebel_storefront::state::AppState;
use reqwest::Client;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running storefront plus the temporary storage behind it.
pub struct TestContext {
    base_url: String,
    storage: TempDir,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start a storefront serving the bundled catalogue.
    pub async fn new() -> Self {
        let public_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/public");
        Self::with_source(CatalogueSource::File(public_dir.join("db.json"))).await
    }

    /// Start a storefront serving a specific catalogue source.
    pub async fn with_source(source: CatalogueSource) -> Self {
        let storage = tempfile::tempdir().expect("Failed to create storage dir");
        let public_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/public");

        let mut config =
            StorefrontConfig::from_lookup(|_| None).expect("Default configuration is valid");
        config.catalogue_source = source;
        config.storage_dir = storage.path().to_path_buf();
        config.public_dir = public_dir;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has an address");

        let app = mebel_storefront::app(AppState::new(config));
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            storage,
            server,
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A new visitor: a client with its own cookie jar.
    #[must_use]
    pub fn visitor(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Root of the per-visitor storage directories.
    #[must_use]
    pub fn storage_dir(&self) -> &std::path::Path {
        self.storage.path()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}
