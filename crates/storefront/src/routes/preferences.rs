//! Theme preference handlers.

use axum::Json;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::Visitor;
use crate::preferences;

/// Current theme.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeView {
    pub dark_mode: bool,
}

/// GET /api/preferences/theme
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn theme(visitor: Visitor) -> Result<Json<ThemeView>> {
    let dark_mode = preferences::dark_mode(visitor.store.storage())?;
    Ok(Json(ThemeView { dark_mode }))
}

/// POST /api/preferences/theme/toggle
#[instrument(skip(visitor), fields(visitor_id = %visitor.id))]
pub async fn toggle_theme(visitor: Visitor) -> Result<Json<ThemeView>> {
    let dark_mode = preferences::toggle_theme(visitor.store.storage())?;
    Ok(Json(ThemeView { dark_mode }))
}
