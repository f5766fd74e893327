//! CLI command implementations.

pub mod basket;
pub mod catalogue;

use std::time::Duration;

use mebel_storefront::catalogue::{CatalogueClient, CatalogueSource};

/// Environment variable consulted when no source is given.
const SOURCE_ENV: &str = "CATALOGUE_SOURCE";

/// Default document location, relative to the workspace root.
const DEFAULT_SOURCE: &str = "crates/storefront/public/db.json";

/// Build a client for an explicit source, `CATALOGUE_SOURCE`, or the bundled
/// document, in that order.
pub(crate) fn catalogue_client(
    source: Option<&str>,
) -> Result<CatalogueClient, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let location = source
        .map(str::to_owned)
        .or_else(|| std::env::var(SOURCE_ENV).ok())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_owned());
    let source = CatalogueSource::from_location(&location)?;

    // One-shot process; the cache only needs to span a single command.
    Ok(CatalogueClient::new(source, Duration::from_secs(60)))
}
