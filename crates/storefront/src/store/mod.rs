//! The catalogue store: per-visitor product, category, works and basket state.
//!
//! # Architecture
//!
//! - One store per visitor, constructed explicitly and shared through `Arc`
//! - All state sits behind a single lock; each mutation and its persistence
//!   happen in one critical section, so readers see whole snapshots
//! - Category loads are sequence-numbered; a response that arrives after a
//!   newer load started is discarded
//! - The basket is written to the key-value surface after every mutation; a
//!   failed write rolls the mutation back and is returned to the caller
//! - The basket is read back from storage on construction and re-resolved
//!   in memory after each product load

mod persist;

pub use persist::{PersistedEntry, RehydrateReport};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mebel_core::{
    Basket, BasketEntry, CategoryDescriptor, CategoryRequest, Listed, Price, ProductId,
    ProductRecord, QuantityChange, WorkItem,
};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::catalogue::{CatalogueClient, CatalogueDocument, CatalogueError};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The catalogue document could not be fetched.
    #[error("catalogue unavailable: {0}")]
    Catalogue(#[from] Arc<CatalogueError>),

    /// The basket could not be written; the mutation was rolled back.
    #[error("basket not saved: {0}")]
    Storage(#[from] StorageError),
}

/// Result of a category load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "count", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The product subset was filled with this many items.
    Products(usize),
    /// The descriptor subset was filled with this many items.
    Categories(usize),
    /// The key matched nothing in the document; both subsets were cleared.
    NotFound,
    /// A newer load started before this one finished; nothing was applied.
    Superseded,
}

/// A consistent copy of the store's state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub products: Vec<Listed<ProductRecord>>,
    pub categories: Vec<Listed<CategoryDescriptor>>,
    pub basket: Vec<BasketEntry>,
    pub total_quantity: u32,
    pub total_price: Price,
    pub selected: Option<CategoryRequest>,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    products: Vec<Listed<ProductRecord>>,
    categories: Vec<Listed<CategoryDescriptor>>,
    works: Vec<Listed<WorkItem>>,
    basket: Basket,
    pending: Vec<PersistedEntry>,
    selected: Option<CategoryRequest>,
    loading: bool,
    latest_request: u64,
}

enum Resolved {
    Products(Vec<ProductRecord>),
    Categories(Vec<CategoryDescriptor>),
    NotFound,
}

impl Resolved {
    fn from_document(document: &CatalogueDocument, request: &CategoryRequest) -> Self {
        match request {
            CategoryRequest::All => Self::Categories(document.descriptors().to_vec()),
            CategoryRequest::AllProducts => Self::Products(document.all_products()),
            CategoryRequest::Category(category) => document
                .products(*category)
                .map_or(Self::NotFound, |items| Self::Products(items.to_vec())),
            CategoryRequest::Unknown(_) => Self::NotFound,
        }
    }
}

/// Basket lines as they would be persisted right now.
fn in_memory_lines(state: &StoreState) -> Vec<PersistedEntry> {
    state
        .basket
        .entries()
        .iter()
        .map(PersistedEntry::from)
        .chain(state.pending.iter().cloned())
        .collect()
}

/// The basket persisted in `storage`, joined against the whole catalogue
/// without writing anything back.
///
/// Lines unknown to `document` are reported as dropped; storage keeps them.
///
/// # Errors
///
/// Returns an error if storage cannot be read or holds a malformed basket.
pub fn peek_basket(
    storage: &dyn KeyValueStore,
    document: &CatalogueDocument,
) -> Result<(Basket, RehydrateReport), StorageError> {
    let persisted = match storage.get(keys::BASKET)? {
        Some(text) => persist::decode(&text).map_err(StorageError::Malformed)?,
        None => Vec::new(),
    };
    let products = Listed::fresh_all(document.all_products());
    let rehydrated = persist::rehydrate(persisted, &products, true);
    Ok((rehydrated.basket, rehydrated.report))
}

/// Product, descriptor, works and basket state for one visitor.
#[derive(Debug)]
pub struct CatalogueStore {
    catalogue: CatalogueClient,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<StoreState>,
    requests: AtomicU64,
}

impl CatalogueStore {
    /// Create a store and restore its basket from `storage`.
    pub fn new(catalogue: CatalogueClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self {
            catalogue,
            storage,
            state: RwLock::new(StoreState::default()),
            requests: AtomicU64::new(0),
        };
        store.rehydrate_basket();
        store
    }

    /// The catalogue client this store loads through.
    #[must_use]
    pub const fn catalogue(&self) -> &CatalogueClient {
        &self.catalogue
    }

    /// The key-value surface backing this store.
    #[must_use]
    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load the listing a category key asks for.
    ///
    /// A descriptor request fills the category subset; a product request
    /// fills the product subset. The other subset is always cleared.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Catalogue`] if the document cannot be fetched.
    /// Loaded state is left untouched in that case.
    #[instrument(skip(self))]
    pub async fn load_category(&self, key: &str) -> Result<LoadOutcome, StoreError> {
        let request = CategoryRequest::parse(key);
        let sequence = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.write();
            state.latest_request = sequence;
            state.loading = true;
        }

        let document = match self.catalogue.document().await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(%request, error = %e, "Failed to load catalogue");
                let mut state = self.write();
                if state.latest_request == sequence {
                    state.loading = false;
                }
                return Err(e.into());
            }
        };

        let resolved = Resolved::from_document(&document, &request);

        let mut state = self.write();
        if state.latest_request != sequence {
            tracing::debug!(%request, sequence, "Stale catalogue response discarded");
            return Ok(LoadOutcome::Superseded);
        }
        state.loading = false;
        state.selected = Some(request.clone());

        let outcome = match resolved {
            Resolved::Products(items) => {
                state.products = Listed::fresh_all(items);
                state.categories.clear();
                let count = state.products.len();
                let persisted = in_memory_lines(&state);
                self.apply_rehydrated(&mut state, persisted, request == CategoryRequest::AllProducts);
                LoadOutcome::Products(count)
            }
            Resolved::Categories(items) => {
                state.categories = Listed::fresh_all(items);
                state.products.clear();
                LoadOutcome::Categories(state.categories.len())
            }
            Resolved::NotFound => {
                tracing::warn!(%request, "Category not found in catalogue");
                state.products.clear();
                state.categories.clear();
                LoadOutcome::NotFound
            }
        };

        tracing::info!(%request, ?outcome, "Category loaded");
        Ok(outcome)
    }

    /// Load the works listing. Products and categories are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Catalogue`] if the document cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_works(&self) -> Result<usize, StoreError> {
        let document = self.catalogue.document().await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to load works");
        })?;

        let mut state = self.write();
        state.works = Listed::fresh_all(document.works().iter().cloned());
        Ok(state.works.len())
    }

    // =========================================================================
    // Basket
    // =========================================================================

    /// Add one unit of `product`. Returns the entry's new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the basket cannot be saved; the
    /// basket is left as it was.
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub fn add_to_basket(&self, product: &ProductRecord) -> Result<u32, StoreError> {
        let mut state = self.write();
        self.commit(&mut state, |basket| basket.add(product))
    }

    /// Add one unit of a loaded product by id.
    ///
    /// Returns `None` (with a warning) if no loaded product has that id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the basket cannot be saved.
    #[instrument(skip(self))]
    pub fn add_to_basket_by_id(&self, id: &ProductId) -> Result<Option<u32>, StoreError> {
        let mut state = self.write();
        let Some(product) = state
            .products
            .iter()
            .find(|p| &p.item.id == id)
            .map(|p| p.item.clone())
        else {
            tracing::warn!(%id, "Product not found among loaded products");
            return Ok(None);
        };
        self.commit(&mut state, |basket| basket.add(&product)).map(Some)
    }

    /// Add one unit to an existing entry. Never creates an entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the basket cannot be saved.
    #[instrument(skip(self))]
    pub fn increment_quantity(&self, id: &ProductId) -> Result<QuantityChange, StoreError> {
        let mut state = self.write();
        if state.basket.get(id).is_none() {
            tracing::warn!(%id, "Increment of product not in basket ignored");
            return Ok(QuantityChange::Missing);
        }
        self.commit(&mut state, |basket| basket.increment(id))
    }

    /// Remove one unit; the entry is removed when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the basket cannot be saved.
    #[instrument(skip(self))]
    pub fn decrement_quantity(&self, id: &ProductId) -> Result<QuantityChange, StoreError> {
        let mut state = self.write();
        if state.basket.get(id).is_none() {
            tracing::warn!(%id, "Decrement of product not in basket ignored");
            return Ok(QuantityChange::Missing);
        }
        self.commit(&mut state, |basket| basket.decrement(id))
    }

    /// Remove an entry regardless of quantity, including a pending one.
    /// Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the basket cannot be saved.
    #[instrument(skip(self))]
    pub fn remove_from_basket(&self, id: &ProductId) -> Result<bool, StoreError> {
        let mut state = self.write();
        let pending = state.pending.clone();
        state.pending.retain(|line| &line.id != id);
        let dropped_pending = state.pending.len() != pending.len();

        let result = self.commit(&mut state, |basket| basket.remove(id));
        if result.is_err() {
            state.pending = pending;
        }
        result.map(|removed| removed || dropped_pending)
    }

    /// Empty the basket.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the basket cannot be saved.
    #[instrument(skip(self))]
    pub fn clear_basket(&self) -> Result<(), StoreError> {
        let mut state = self.write();
        let pending = std::mem::take(&mut state.pending);

        let result = self.commit(&mut state, Basket::clear);
        if result.is_err() {
            state.pending = pending;
        }
        result
    }

    /// Sum of basket quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.read().basket.total_quantity()
    }

    /// Sum of basket line prices.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.read().basket.total_price()
    }

    /// Copy of the basket entries.
    #[must_use]
    pub fn basket(&self) -> Vec<BasketEntry> {
        self.read().basket.entries().to_vec()
    }

    /// Rebuild the basket from the key-value surface against the loaded
    /// products.
    ///
    /// Malformed persisted data is logged and leaves the basket empty.
    #[instrument(skip(self))]
    pub fn rehydrate_basket(&self) -> RehydrateReport {
        let mut state = self.write();
        let persisted = match self.storage.get(keys::BASKET) {
            Ok(Some(text)) => persist::decode(&text).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Persisted basket is malformed, starting empty");
                Vec::new()
            }),
            Ok(None) => in_memory_lines(&state),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read persisted basket");
                return RehydrateReport::default();
            }
        };
        self.apply_rehydrated(&mut state, persisted, false)
    }

    fn apply_rehydrated(
        &self,
        state: &mut StoreState,
        persisted: Vec<PersistedEntry>,
        whole_catalogue: bool,
    ) -> RehydrateReport {
        let rehydrated = persist::rehydrate(persisted, &state.products, whole_catalogue);
        state.basket = rehydrated.basket;
        state.pending = rehydrated.pending;

        // The in-memory basket stays authoritative; the next mutation retries.
        if let Err(e) = self.persist_locked(state) {
            tracing::error!(error = %e, "Failed to persist rehydrated basket");
        }

        let report = rehydrated.report;
        if !report.dropped.is_empty() {
            tracing::warn!(dropped = report.dropped.len(), "Basket entries dropped during rehydration");
        }
        report
    }

    /// Apply `mutate` to the basket and persist, restoring the previous
    /// basket if the write fails.
    fn commit<T>(
        &self,
        state: &mut StoreState,
        mutate: impl FnOnce(&mut Basket) -> T,
    ) -> Result<T, StoreError> {
        let previous = state.basket.clone();
        let value = mutate(&mut state.basket);
        if let Err(e) = self.persist_locked(state) {
            tracing::error!(error = %e, "Failed to persist basket, change rolled back");
            state.basket = previous;
            return Err(e.into());
        }
        Ok(value)
    }

    fn persist_locked(&self, state: &StoreState) -> Result<(), StorageError> {
        let text = persist::encode(&state.basket, &state.pending)?;
        self.storage.set(keys::BASKET, &text)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the loaded products.
    #[must_use]
    pub fn products(&self) -> Vec<Listed<ProductRecord>> {
        self.read().products.clone()
    }

    /// Copy of the loaded category descriptors.
    #[must_use]
    pub fn categories(&self) -> Vec<Listed<CategoryDescriptor>> {
        self.read().categories.clone()
    }

    /// Copy of the loaded works.
    #[must_use]
    pub fn works(&self) -> Vec<Listed<WorkItem>> {
        self.read().works.clone()
    }

    /// Whether a category load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    /// A consistent copy of everything a view renders.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read();
        StoreSnapshot {
            products: state.products.clone(),
            categories: state.categories.clone(),
            basket: state.basket.entries().to_vec(),
            total_quantity: state.basket.total_quantity(),
            total_price: state.basket.total_price(),
            selected: state.selected.clone(),
            loading: state.loading,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use mebel_core::Category;
    use proptest::prelude::*;

    use super::*;
    use crate::catalogue::CatalogueSource;
    use crate::storage::{FileStore, MemoryStore};

    const DOC: &str = r#"{
        "kitchen": [
            { "id": "k1", "name": "Кухня Лайт", "category": "кухни", "color": "белый", "price": "45000" },
            { "id": "k2", "name": "Кухня Модерн", "category": "кухни", "color": ["серый", "белый"], "price": "52000" },
            { "id": "k3", "name": "Кухня Классик", "category": "кухни", "color": "дуб", "price": "61000" },
            { "id": "k4", "name": "Кухня Лофт", "category": "кухни", "color": "чёрный", "price": "58000" },
            { "id": "k5", "name": "Кухня Прованс", "category": "кухни", "color": "бежевый", "price": "49000" }
        ],
        "bedroom": [
            { "id": "b1", "name": "Спальня Мила", "category": "спальни", "color": "белый", "price": "70000" },
            { "id": "b2", "name": "Спальня Вега", "category": "спальни", "color": "венге", "price": "82000" }
        ],
        "catalogueProducts": [
            { "id": "kitchen", "name": "Кухни", "imgSrc": "/img/kitchen.jpg" },
            { "id": "bedroom", "name": "Спальни" }
        ],
        "works": [
            { "id": "w1", "title": "Кухня на Ленина" }
        ]
    }"#;

    fn client() -> CatalogueClient {
        CatalogueClient::new(
            CatalogueSource::Inline(DOC.to_string()),
            Duration::from_secs(60),
        )
    }

    fn store() -> CatalogueStore {
        CatalogueStore::new(client(), Arc::new(MemoryStore::new()))
    }

    fn product(id: &str) -> ProductRecord {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": id, "color": "белый", "price": "100"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_kitchen() {
        let store = store();
        let outcome = store.load_category("kitchen").await.unwrap();
        assert_eq!(outcome, LoadOutcome::Products(5));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.products.len(), 5);
        assert!(snapshot.categories.is_empty());
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.selected,
            Some(CategoryRequest::Category(Category::Kitchen))
        );

        let uids: HashSet<_> = snapshot.products.iter().map(|p| p.uid).collect();
        assert_eq!(uids.len(), 5);
    }

    #[tokio::test]
    async fn test_load_all_fills_categories_only() {
        let store = store();
        store.load_category("kitchen").await.unwrap();

        let outcome = store.load_category("all").await.unwrap();
        assert_eq!(outcome, LoadOutcome::Categories(2));
        assert!(store.products().is_empty());
        assert_eq!(store.categories()[0].item.path(), "/catalogue/kitchen");
    }

    #[tokio::test]
    async fn test_all_products_flattens_categories() {
        let store = store();
        let outcome = store.load_category("products").await.unwrap();
        assert_eq!(outcome, LoadOutcome::Products(7));
    }

    #[tokio::test]
    async fn test_nonexistent_key_clears_both() {
        let store = store();
        store.load_category("kitchen").await.unwrap();

        let outcome = store.load_category("nonexistent").await.unwrap();
        assert_eq!(outcome, LoadOutcome::NotFound);
        assert!(store.products().is_empty());
        assert!(store.categories().is_empty());

        // Known category missing from the document.
        assert_eq!(
            store.load_category("hallway").await.unwrap(),
            LoadOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_switching_categories_refreshes_uids() {
        let store = store();
        store.load_category("kitchen").await.unwrap();
        let first: HashSet<_> = store.products().iter().map(|p| p.uid).collect();

        store.load_category("Bedroom").await.unwrap();
        let products = store.products();
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| !first.contains(&p.uid)));

        store.load_category("kitchen").await.unwrap();
        let again: HashSet<_> = store.products().iter().map(|p| p.uid).collect();
        assert!(first.is_disjoint(&again));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, DOC).unwrap();

        let client = CatalogueClient::new(CatalogueSource::File(path.clone()), Duration::from_secs(60));
        let store = CatalogueStore::new(client.clone(), Arc::new(MemoryStore::new()));
        store.load_category("kitchen").await.unwrap();

        std::fs::remove_file(&path).unwrap();
        client.invalidate().await;

        let err = store.load_category("bedroom").await.unwrap_err();
        assert!(matches!(err, StoreError::Catalogue(_)));
        assert_eq!(store.products().len(), 5);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_basket_walk() {
        let store = store();
        store.load_category("kitchen").await.unwrap();
        let x = store.products()[0].item.clone();

        assert_eq!(store.add_to_basket(&x).unwrap(), 1);
        assert_eq!(store.add_to_basket(&x).unwrap(), 2);
        assert_eq!(store.increment_quantity(&x.id).unwrap(), QuantityChange::Updated(3));
        assert_eq!(store.decrement_quantity(&x.id).unwrap(), QuantityChange::Updated(2));
        assert_eq!(store.decrement_quantity(&x.id).unwrap(), QuantityChange::Updated(1));
        assert_eq!(store.decrement_quantity(&x.id).unwrap(), QuantityChange::Removed);
        assert!(store.basket().is_empty());
        assert_eq!(store.total_quantity(), 0);
    }

    #[tokio::test]
    async fn test_increment_absent_is_noop() {
        let store = store();
        assert_eq!(
            store.increment_quantity(&ProductId::new("ghost")).unwrap(),
            QuantityChange::Missing
        );
        assert!(store.basket().is_empty());
        assert!(!store.remove_from_basket(&ProductId::new("ghost")).unwrap());
    }

    #[tokio::test]
    async fn test_totals() {
        let store = store();
        store.load_category("kitchen").await.unwrap();

        assert_eq!(store.add_to_basket_by_id(&ProductId::new("k1")).unwrap(), Some(1));
        assert_eq!(store.add_to_basket_by_id(&ProductId::new("k1")).unwrap(), Some(2));
        assert_eq!(store.add_to_basket_by_id(&ProductId::new("k2")).unwrap(), Some(1));
        assert_eq!(store.add_to_basket_by_id(&ProductId::new("b1")).unwrap(), None);

        assert_eq!(store.total_quantity(), 3);
        assert_eq!(store.total_price(), Price::parse("142000").unwrap());

        store.clear_basket().unwrap();
        assert_eq!(store.total_quantity(), 0);
    }

    #[tokio::test]
    async fn test_basket_survives_fresh_store() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let store = CatalogueStore::new(client(), Arc::clone(&storage));
        store.load_category("kitchen").await.unwrap();
        let products = store.products();
        store.add_to_basket(&products[0].item).unwrap();
        store.add_to_basket(&products[0].item).unwrap();
        store.add_to_basket(&products[1].item).unwrap();
        drop(store);

        let reopened = CatalogueStore::new(client(), storage);
        assert_eq!(reopened.total_quantity(), 3);

        reopened.load_category("kitchen").await.unwrap();
        let basket = reopened.basket();
        assert_eq!(basket.len(), 2);
        assert_eq!(basket[0].quantity, 2);
        assert_eq!(basket[1].quantity, 1);
    }

    #[tokio::test]
    async fn test_basket_survives_category_switch() {
        let store = store();
        store.load_category("kitchen").await.unwrap();
        store.add_to_basket(&store.products()[0].item).unwrap();

        store.load_category("bedroom").await.unwrap();
        let basket = store.basket();
        assert_eq!(basket.len(), 1);
        assert_eq!(basket[0].id().as_str(), "k1");
    }

    #[tokio::test]
    async fn test_legacy_entries_wait_for_their_products() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(keys::BASKET, r#"[{"id":"b1","quantity":2},{"id":"zz","quantity":1}]"#)
            .unwrap();
        let store = CatalogueStore::new(client(), Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        assert!(store.basket().is_empty());

        store.load_category("kitchen").await.unwrap();
        assert!(store.basket().is_empty());

        store.load_category("bedroom").await.unwrap();
        assert_eq!(store.total_quantity(), 2);

        // The whole catalogue does not know "zz".
        store.load_category("products").await.unwrap();
        let persisted = storage.get(keys::BASKET).unwrap().unwrap();
        assert!(!persisted.contains("zz"));
        assert_eq!(store.total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_rehydrate_after_external_write() {
        let storage = Arc::new(MemoryStore::new());
        let store = CatalogueStore::new(client(), Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        store.load_category("kitchen").await.unwrap();

        storage
            .set(keys::BASKET, r#"[{"id":"k1","quantity":2},{"id":"zz","quantity":1},{"id":"k2","quantity":0}]"#)
            .unwrap();
        let report = store.rehydrate_basket();
        assert_eq!(report.from_catalogue, 1);
        assert_eq!(report.pending, 1);
        assert_eq!(report.dropped, [ProductId::new("k2")]);
        assert_eq!(store.total_quantity(), 2);

        assert!(store.remove_from_basket(&ProductId::new("zz")).unwrap());
        assert!(!storage.get(keys::BASKET).unwrap().unwrap().contains("zz"));
    }

    #[tokio::test]
    async fn test_malformed_basket_starts_empty() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::BASKET, "{not json").unwrap();

        let store = CatalogueStore::new(client(), storage);
        assert!(store.basket().is_empty());
        store.add_to_basket(&product("p1")).unwrap();
        assert_eq!(store.total_quantity(), 1);
    }

    #[tokio::test]
    async fn test_file_backed_basket() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogueStore::new(client(), Arc::new(FileStore::new(dir.path())));
        store.add_to_basket(&product("p1")).unwrap();
        drop(store);

        let reopened = CatalogueStore::new(client(), Arc::new(FileStore::new(dir.path())));
        assert_eq!(reopened.total_quantity(), 1);
    }

    #[test]
    fn test_peek_basket_leaves_storage_untouched() {
        let storage = MemoryStore::new();
        let stored = r#"[{"id":"k1","quantity":2},{"id":"gone","quantity":1}]"#;
        storage.set(keys::BASKET, stored).unwrap();
        let document = CatalogueDocument::from_json(DOC).unwrap();

        let (basket, report) = peek_basket(&storage, &document).unwrap();
        assert_eq!(basket.total_quantity(), 2);
        assert_eq!(basket.total_price(), Price::parse("90000").unwrap());
        assert_eq!(report.dropped, [ProductId::new("gone")]);
        assert_eq!(storage.get(keys::BASKET).unwrap().as_deref(), Some(stored));

        storage.set(keys::BASKET, "{not json").unwrap();
        assert!(matches!(
            peek_basket(&storage, &document),
            Err(StorageError::Malformed(_))
        ));
    }

    /// Serve `DOC` over HTTP, answering each request after `delay`.
    async fn slow_catalogue(delay: Duration) -> url::Url {
        let app = axum::Router::new().route(
            "/db.json",
            axum::routing::get(move || async move {
                tokio::time::sleep(delay).await;
                DOC
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        url::Url::parse(&format!("http://{addr}/db.json")).unwrap()
    }

    #[tokio::test]
    async fn test_older_load_finishing_last_is_superseded() {
        let url = slow_catalogue(Duration::from_millis(50)).await;
        let client = CatalogueClient::new(CatalogueSource::Http(url), Duration::from_secs(60));
        let store = CatalogueStore::new(client, Arc::new(MemoryStore::new()));

        // The kitchen fetch is still in flight when the bedroom load starts.
        let (kitchen, bedroom) =
            tokio::join!(store.load_category("kitchen"), store.load_category("bedroom"));

        assert_eq!(kitchen.unwrap(), LoadOutcome::Superseded);
        assert_eq!(bedroom.unwrap(), LoadOutcome::Products(2));

        let ids: Vec<_> = store
            .products()
            .iter()
            .map(|p| p.item.id.as_str().to_owned())
            .collect();
        assert_eq!(ids, ["b1", "b2"]);
        assert!(store.categories().is_empty());
        assert!(!store.is_loading());
        assert_eq!(
            store.snapshot().selected,
            Some(CategoryRequest::Category(Category::Bedroom))
        );
    }

    /// Memory-backed storage whose writes can be switched off.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_and_is_not_reverted_later() {
        let storage = Arc::new(FlakyStore::default());
        let store = CatalogueStore::new(client(), Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        store.load_category("kitchen").await.unwrap();
        let k1 = ProductId::new("k1");
        assert_eq!(store.add_to_basket_by_id(&k1).unwrap(), Some(1));

        storage.fail_writes(true);
        assert!(matches!(store.add_to_basket_by_id(&k1), Err(StoreError::Storage(_))));
        assert!(matches!(store.increment_quantity(&k1), Err(StoreError::Storage(_))));
        assert!(matches!(store.decrement_quantity(&k1), Err(StoreError::Storage(_))));
        assert!(matches!(store.remove_from_basket(&k1), Err(StoreError::Storage(_))));
        assert!(matches!(store.clear_basket(), Err(StoreError::Storage(_))));
        assert_eq!(store.total_quantity(), 1);

        store.load_category("bedroom").await.unwrap();
        assert_eq!(store.total_quantity(), 1);

        storage.fail_writes(false);
        assert_eq!(store.increment_quantity(&k1).unwrap(), QuantityChange::Updated(2));
        store.load_category("kitchen").await.unwrap();
        assert_eq!(store.total_quantity(), 2);

        let reopened = CatalogueStore::new(client(), storage);
        assert_eq!(reopened.total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_load_keeps_in_memory_basket_over_stale_storage() {
        let storage = Arc::new(FlakyStore::default());
        let store = CatalogueStore::new(client(), Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        store.add_to_basket(&product("p1")).unwrap();

        // Rehydration after a load cannot write either; memory stays as is.
        storage.fail_writes(true);
        store.load_category("kitchen").await.unwrap();
        assert_eq!(store.total_quantity(), 1);
        assert_eq!(store.basket()[0].id().as_str(), "p1");
    }

    #[tokio::test]
    async fn test_ceiling_priced_lines_total_without_overflow() {
        let store = store();
        let mut yacht = product("yacht");
        yacht.price = Price::new(Price::MAX_AMOUNT).unwrap();
        for _ in 0..3 {
            store.add_to_basket(&yacht).unwrap();
        }
        store.add_to_basket(&product("p1")).unwrap();

        let expected: Price = [yacht.price.times(3), Price::parse("100").unwrap()]
            .into_iter()
            .sum();
        assert_eq!(store.total_price(), expected);
        assert_eq!(store.snapshot().total_price, expected);

        let absurd = serde_json::from_value::<ProductRecord>(serde_json::json!({
            "id": "x", "name": "x", "price": "79228162514264337593543950335"
        }));
        assert!(absurd.is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn test_persisted_basket_tracks_every_mutation(
            ops in prop::collection::vec((0..4_usize, 0..4_u8), 0..60)
        ) {
            let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
            let store = CatalogueStore::new(client(), Arc::clone(&storage));
            let products: Vec<_> = (0..4).map(|i| product(&format!("p{i}"))).collect();
            let unit = Price::parse("100").unwrap();

            for (index, op) in ops {
                let p = &products[index];
                match op {
                    0 => {
                        store.add_to_basket(p).unwrap();
                    }
                    1 => {
                        store.increment_quantity(&p.id).unwrap();
                    }
                    2 => {
                        store.decrement_quantity(&p.id).unwrap();
                    }
                    _ => {
                        store.remove_from_basket(&p.id).unwrap();
                    }
                }

                let basket = store.basket();
                let quantity: u32 = basket.iter().map(|e| e.quantity).sum();
                prop_assert!(basket.iter().all(|e| e.quantity >= 1));
                prop_assert_eq!(store.total_quantity(), quantity);
                prop_assert_eq!(store.total_price(), unit.times(quantity));

                let reopened = CatalogueStore::new(client(), Arc::clone(&storage));
                prop_assert_eq!(reopened.basket(), basket);
            }
        }
    }

    #[tokio::test]
    async fn test_load_works() {
        let store = store();
        store.load_category("kitchen").await.unwrap();
        assert_eq!(store.load_works().await.unwrap(), 1);
        assert_eq!(store.works()[0].item.title, "Кухня на Ленина");
        assert_eq!(store.products().len(), 5);
    }
}
