//! Catalogue document checks and listings.

use tracing::{error, info, warn};

use mebel_storefront::catalogue::CatalogueClient;
use mebel_storefront::storage::MemoryStore;
use mebel_storefront::store::{CatalogueStore, LoadOutcome};

use std::sync::Arc;

/// Validate a catalogue document and report what it contains.
///
/// # Errors
///
/// Returns an error if the document cannot be fetched, is malformed, or
/// contains flagged keys.
pub async fn check(client: &CatalogueClient) -> Result<(), Box<dyn std::error::Error>> {
    info!(source = %client.source(), "Checking catalogue document");
    let document = client.fetch().await?;

    for (category, count) in document.categories() {
        info!(%category, label = category.label(), products = count, "Category");
    }

    let descriptors = document.descriptors();
    info!(descriptors = descriptors.len(), works = document.works().len(), "Listings");
    for descriptor in descriptors {
        if descriptor.category().is_none() {
            warn!(id = %descriptor.id, "Descriptor does not name a known category");
        }
    }

    let report = document.report();
    if report.is_clean() {
        info!("Catalogue document is clean");
        return Ok(());
    }

    for key in &report.unknown_keys {
        error!(%key, "Unknown key");
    }
    for key in &report.duplicate_keys {
        error!(%key, "Duplicate category key");
    }
    for (key, reason) in &report.malformed {
        error!(%key, %reason, "Malformed listing");
    }

    let problems = report.unknown_keys.len() + report.duplicate_keys.len() + report.malformed.len();
    Err(format!("{problems} problem(s) found in catalogue document").into())
}

/// List what a category key resolves to, the way the storefront would load it.
///
/// # Errors
///
/// Returns an error if the document cannot be fetched or the key matches
/// nothing.
pub async fn list(client: CatalogueClient, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = CatalogueStore::new(client, Arc::new(MemoryStore::new()));

    match store.load_category(key).await? {
        LoadOutcome::Categories(count) => {
            info!(count, "Category descriptors");
            for listed in store.categories() {
                let descriptor = &listed.item;
                info!(id = %descriptor.id, name = %descriptor.name, path = %descriptor.path(), "Descriptor");
            }
        }
        LoadOutcome::Products(count) => {
            info!(count, "Products");
            for listed in store.products() {
                let product = &listed.item;
                let colors: Vec<&str> = product.color.iter().collect();
                info!(
                    id = %product.id,
                    name = %product.name,
                    price = %product.price.display(),
                    colors = %colors.join(", "),
                    "Product"
                );
            }
        }
        LoadOutcome::NotFound => return Err(format!("no listing for key {key:?}").into()),
        LoadOutcome::Superseded => {}
    }

    Ok(())
}
