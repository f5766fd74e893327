//! Persisted basket inspection.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use mebel_storefront::catalogue::CatalogueClient;
use mebel_storefront::storage::FileStore;
use mebel_storefront::store::{CatalogueStore, peek_basket};

fn visitor_dir(dir: &Path) -> Result<&Path, Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }
    Ok(dir)
}

/// Show a visitor's persisted basket, re-joined against the full catalogue.
///
/// The stored basket is only read; lines the catalogue no longer carries are
/// reported and left in place.
///
/// # Errors
///
/// Returns an error if the directory does not exist, the catalogue cannot
/// be fetched, or the stored basket cannot be read.
pub async fn show(client: CatalogueClient, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStore::new(visitor_dir(dir)?);
    let document = client.document().await?;
    let (basket, report) = peek_basket(&storage, &document)?;

    for id in &report.dropped {
        warn!(%id, "Stored line not in the catalogue");
    }
    if basket.is_empty() {
        info!(dir = %dir.display(), "Basket is empty");
        return Ok(());
    }

    for entry in basket.entries() {
        info!(
            id = %entry.id(),
            name = %entry.product.name,
            quantity = entry.quantity,
            line_price = %entry.line_price().display(),
            "Basket line"
        );
    }
    info!(
        quantity = basket.total_quantity(),
        total = %basket.total_price().display(),
        "Basket total"
    );
    Ok(())
}

/// Empty a visitor's persisted basket.
///
/// # Errors
///
/// Returns an error if the directory does not exist or cannot be written.
pub fn clear(client: CatalogueClient, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = CatalogueStore::new(client, Arc::new(FileStore::new(visitor_dir(dir)?)));
    let removed = store.total_quantity();
    store.clear_basket()?;
    if removed == 0 {
        warn!(dir = %dir.display(), "Basket was already empty");
    } else {
        info!(removed, "Basket cleared");
    }
    Ok(())
}
