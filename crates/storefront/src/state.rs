//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use uuid::Uuid;

use crate::catalogue::CatalogueClient;
use crate::config::StorefrontConfig;
use crate::storage::FileStore;
use crate::store::CatalogueStore;

/// Upper bound on visitor stores held in memory at once.
const MAX_LIVE_VISITORS: u64 = 10_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalogue client, the per-visitor stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalogue: CatalogueClient,
    visitors: Cache<Uuid, Arc<CatalogueStore>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let catalogue = CatalogueClient::new(config.catalogue_source.clone(), config.catalogue_ttl);

        // Idle stores are dropped; their baskets stay on disk and are
        // rehydrated the next time the visitor shows up.
        let visitors = Cache::builder()
            .max_capacity(MAX_LIVE_VISITORS)
            .time_to_idle(config.visitor_idle)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalogue,
                visitors,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shared catalogue client.
    #[must_use]
    pub fn catalogue(&self) -> &CatalogueClient {
        &self.inner.catalogue
    }

    /// Get the store for a visitor, constructing it on first use.
    pub async fn visitor_store(&self, visitor_id: Uuid) -> Arc<CatalogueStore> {
        self.inner
            .visitors
            .get_with(visitor_id, async {
                let root = self.inner.config.storage_dir.join(visitor_id.to_string());
                tracing::debug!(%visitor_id, root = %root.display(), "Opening visitor store");
                Arc::new(CatalogueStore::new(
                    self.inner.catalogue.clone(),
                    Arc::new(FileStore::new(root)),
                ))
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mebel_core::{ProductId, ProductRecord};

    use super::*;
    use crate::catalogue::CatalogueSource;

    fn state(dir: &std::path::Path) -> AppState {
        let mut config = StorefrontConfig::from_lookup(|_| None).unwrap();
        config.catalogue_source = CatalogueSource::Inline("{}".to_string());
        config.storage_dir = dir.to_path_buf();
        AppState::new(config)
    }

    #[tokio::test]
    async fn test_visitor_stores_are_shared_and_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let product: ProductRecord = serde_json::from_value(serde_json::json!({
            "id": "k1", "name": "Кухня", "color": "белый", "price": "100"
        }))
        .unwrap();

        state.visitor_store(alice).await.add_to_basket(&product).unwrap();

        let again = state.visitor_store(alice).await;
        assert_eq!(again.total_quantity(), 1);
        assert!(again.basket()[0].id() == &ProductId::new("k1"));
        assert_eq!(state.visitor_store(bob).await.total_quantity(), 0);
        assert!(dir.path().join(alice.to_string()).join("basket.json").exists());
    }
}
