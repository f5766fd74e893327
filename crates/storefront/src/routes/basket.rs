//! Basket route handlers.
//!
//! All mutations are persisted to the visitor's storage before the response
//! is sent.

use axum::{
    Json,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
};
use mebel_core::{BasketEntry, Price, ProductId, ProductRecord, QuantityChange};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::Visitor;

/// Basket contents with computed totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketView {
    pub entries: Vec<BasketEntry>,
    pub total_quantity: u32,
    pub total_price: Price,
}

impl BasketView {
    fn of(visitor: &Visitor) -> Self {
        let snapshot = visitor.store.snapshot();
        Self {
            entries: snapshot.basket,
            total_quantity: snapshot.total_quantity,
            total_price: snapshot.total_price,
        }
    }
}

/// Basket count badge.
#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u32,
}

/// Body of an add request: a full product, or the id of a loaded one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddToBasketRequest {
    Product(ProductRecord),
    ById { id: ProductId },
}

/// Quantity after an add.
#[derive(Debug, Serialize)]
pub struct AddedView {
    pub id: ProductId,
    pub quantity: u32,
}

/// Result of a removal.
#[derive(Debug, Serialize)]
pub struct RemovedView {
    pub removed: bool,
}

/// Show the basket.
///
/// GET /api/basket
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn show(visitor: Visitor) -> Json<BasketView> {
    Json(BasketView::of(&visitor))
}

/// Total quantity, for the header badge.
///
/// GET /api/basket/count
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn count(visitor: Visitor) -> Json<CountView> {
    Json(CountView {
        count: visitor.store.total_quantity(),
    })
}

/// Add one unit of a product.
///
/// POST /api/basket
///
/// A body that is neither a product nor `{ "id" }`, or a product with an
/// unacceptable price, is a 400.
#[instrument(skip(visitor, payload), fields(visitor_id = %visitor.id))]
pub async fn add(
    visitor: Visitor,
    payload: std::result::Result<Json<AddToBasketRequest>, JsonRejection>,
) -> Result<Json<AddedView>> {
    let Json(request) = payload?;
    let (id, quantity) = match request {
        AddToBasketRequest::Product(product) => {
            let quantity = visitor.store.add_to_basket(&product)?;
            (product.id, quantity)
        }
        AddToBasketRequest::ById { id } => {
            let quantity = visitor
                .store
                .add_to_basket_by_id(&id)?
                .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
            (id, quantity)
        }
    };

    add_breadcrumb("basket", "Added product", Some(&[("product_id", id.as_str())]));
    Ok(Json(AddedView { id, quantity }))
}

fn quantity_response(id: &ProductId, change: QuantityChange) -> Result<Json<QuantityChange>> {
    if change == QuantityChange::Missing {
        return Err(AppError::NotFound(format!("product {id} in basket")));
    }
    Ok(Json(change))
}

/// Add one unit to an existing line.
///
/// POST /api/basket/{id}/increment
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn increment(visitor: Visitor, Path(id): Path<String>) -> Result<Json<QuantityChange>> {
    let id = ProductId::new(id);
    quantity_response(&id, visitor.store.increment_quantity(&id)?)
}

/// Remove one unit; the line disappears at zero.
///
/// POST /api/basket/{id}/decrement
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn decrement(visitor: Visitor, Path(id): Path<String>) -> Result<Json<QuantityChange>> {
    let id = ProductId::new(id);
    quantity_response(&id, visitor.store.decrement_quantity(&id)?)
}

/// Remove a line regardless of quantity.
///
/// DELETE /api/basket/{id}
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn remove(visitor: Visitor, Path(id): Path<String>) -> Result<Json<RemovedView>> {
    Ok(Json(RemovedView {
        removed: visitor.store.remove_from_basket(&ProductId::new(id))?,
    }))
}

/// Empty the basket.
///
/// DELETE /api/basket
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn clear(visitor: Visitor) -> Result<StatusCode> {
    visitor.store.clear_basket()?;
    Ok(StatusCode::NO_CONTENT)
}
