//! Visitor extractor.
//!
//! Every browser gets a visitor id stored in its session on first contact.
//! The id selects that visitor's [`CatalogueStore`].

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, set_sentry_visitor};
use crate::state::AppState;
use crate::store::CatalogueStore;

/// Session key holding the visitor id.
pub const VISITOR_ID_KEY: &str = "visitor_id";

/// The current visitor and their store.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(visitor: Visitor) -> impl IntoResponse {
///     Json(visitor.store.snapshot())
/// }
/// ```
pub struct Visitor {
    pub id: Uuid,
    pub store: Arc<CatalogueStore>,
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let id = match session.get::<Uuid>(VISITOR_ID_KEY).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                let id = Uuid::new_v4();
                session
                    .insert(VISITOR_ID_KEY, id)
                    .await
                    .map_err(|e| AppError::Internal(format!("failed to start session: {e}")))?;
                tracing::debug!(visitor_id = %id, "New visitor");
                id
            }
            Err(e) => return Err(AppError::Internal(format!("failed to read session: {e}"))),
        };

        set_sentry_visitor(&id);

        let store = state.visitor_store(id).await;
        Ok(Self { id, store })
    }
}
