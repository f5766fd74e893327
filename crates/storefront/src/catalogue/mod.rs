//! Catalogue client: fetches, validates and memoizes the catalogue document.
//!
//! # Architecture
//!
//! - The document is a static JSON file served over HTTP (or read from disk)
//! - It is validated once per fetch into a typed [`CatalogueDocument`]
//! - The validated document is cached in `moka`; concurrent misses share one
//!   fetch and failures are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use mebel_storefront::catalogue::{CatalogueClient, CatalogueSource};
//!
//! let client = CatalogueClient::new(
//!     CatalogueSource::from_location("http://localhost:3000/db.json")?,
//!     Duration::from_secs(300),
//! );
//! let document = client.document().await?;
//! let kitchens = document.products(Category::Kitchen);
//! ```

mod document;
mod source;

pub use document::{CatalogueDocument, DocumentReport};
pub use source::CatalogueSource;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur while fetching the catalogue document.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("catalogue request returned HTTP {0}")]
    Status(u16),

    /// Reading a local document failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a JSON object.
    #[error("malformed catalogue document: {0}")]
    Malformed(String),
}

/// Memoizing client for one catalogue source.
///
/// Cheaply cloneable; clones share the cache.
#[derive(Clone)]
pub struct CatalogueClient {
    inner: Arc<CatalogueClientInner>,
}

struct CatalogueClientInner {
    source: CatalogueSource,
    http: reqwest::Client,
    cache: Cache<String, Arc<CatalogueDocument>>,
}

impl fmt::Debug for CatalogueClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogueClient")
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}

impl CatalogueClient {
    /// Create a client whose cached document lives for `ttl`.
    #[must_use]
    pub fn new(source: CatalogueSource, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogueClientInner {
                source,
                http: reqwest::Client::new(),
                cache,
            }),
        }
    }

    /// The source this client reads.
    #[must_use]
    pub fn source(&self) -> &CatalogueSource {
        &self.inner.source
    }

    /// The validated document, fetched at most once per cache lifetime.
    ///
    /// # Errors
    ///
    /// Returns the fetch or parse error; the error is shared between every
    /// caller that waited on the same fetch.
    pub async fn document(&self) -> Result<Arc<CatalogueDocument>, Arc<CatalogueError>> {
        let key = self.inner.source.cache_key();
        self.inner
            .cache
            .try_get_with(key, async { self.fetch().await.map(Arc::new) })
            .await
    }

    /// Fetch and validate the document, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreachable or the document is not
    /// a JSON object.
    #[instrument(skip(self), fields(source = %self.inner.source))]
    pub async fn fetch(&self) -> Result<CatalogueDocument, CatalogueError> {
        let text = self.inner.source.read(&self.inner.http).await?;
        let document = CatalogueDocument::from_json(&text)?;
        tracing::info!(
            categories = document.categories().count(),
            descriptors = document.descriptors().len(),
            works = document.works().len(),
            "Catalogue document loaded"
        );
        Ok(document)
    }

    /// Drop the cached document; the next [`document`](Self::document) call
    /// fetches again.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate(&self.inner.source.cache_key()).await;
        tracing::info!(source = %self.inner.source, "Catalogue cache invalidated");
    }
}
