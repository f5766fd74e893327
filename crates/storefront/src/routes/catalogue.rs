//! Catalogue route handlers.
//!
//! Each load goes through the visitor's store, so the response reflects what
//! that visitor's views would render: one subset filled, the other empty.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mebel_core::{Listed, WorkItem};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::Visitor;
use crate::state::AppState;
use crate::store::{LoadOutcome, StoreSnapshot};

/// Response for a category load.
#[derive(Debug, Serialize)]
pub struct CatalogueView {
    pub outcome: LoadOutcome,
    #[serde(flatten)]
    pub snapshot: StoreSnapshot,
}

async fn load(visitor: &Visitor, key: &str) -> Result<Json<CatalogueView>> {
    let outcome = visitor.store.load_category(key).await?;
    if outcome == LoadOutcome::NotFound {
        return Err(AppError::NotFound(format!("category {key}")));
    }
    Ok(Json(CatalogueView {
        outcome,
        snapshot: visitor.store.snapshot(),
    }))
}

/// Category descriptor listing.
///
/// GET /api/catalogue
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn index(visitor: Visitor) -> Result<Json<CatalogueView>> {
    load(&visitor, "all").await
}

/// Products of one category.
///
/// GET /api/catalogue/{category}
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn show(visitor: Visitor, Path(category): Path<String>) -> Result<Json<CatalogueView>> {
    load(&visitor, &category).await
}

/// Drop the cached catalogue document so the next load re-fetches it.
///
/// POST /api/catalogue/refresh
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> StatusCode {
    state.catalogue().invalidate().await;
    StatusCode::NO_CONTENT
}

/// Completed works listing.
///
/// GET /api/works
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn works(visitor: Visitor) -> Result<Json<Vec<Listed<WorkItem>>>> {
    visitor.store.load_works().await?;
    Ok(Json(visitor.store.works()))
}
