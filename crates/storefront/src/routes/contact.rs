//! Contact form route handlers.
//!
//! Handles "call me back" requests from the storefront modal. Valid requests
//! are cached in the visitor's storage and logged; nothing is sent onward.

use axum::{Json, extract::rejection::JsonRejection};
use mebel_core::CallbackRequest;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::Visitor;
use crate::preferences::{self, SubmittedCallback};

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub callback: SubmittedCallback,
}

/// Last submitted call-back request.
#[derive(Debug, Serialize)]
pub struct PrefillResponse {
    pub callback: Option<SubmittedCallback>,
}

/// The visitor's last call-back request, to prefill the form.
///
/// GET /api/contact/callback
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn prefill(visitor: Visitor) -> Result<Json<PrefillResponse>> {
    let callback = preferences::last_callback(visitor.store.storage())?;
    Ok(Json(PrefillResponse { callback }))
}

/// Submit a call-back request.
///
/// POST /api/contact/callback
///
/// Invalid fields produce a 400 with a message per field; an unreadable
/// body produces a plain 400.
#[instrument(skip(visitor, payload), fields(visitor_id = %visitor.id))]
pub async fn callback(
    visitor: Visitor,
    payload: std::result::Result<Json<CallbackRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>> {
    let Json(form) = payload?;
    let callback = preferences::submit_callback(visitor.store.storage(), &form)?;
    Ok(Json(ContactResponse {
        success: true,
        callback,
    }))
}
