//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Catalogue document reachable
//! GET    /db.json                       - Bundled catalogue document (static)
//!
//! # Catalogue
//! GET    /api/catalogue                 - Category descriptors
//! GET    /api/catalogue/{category}      - Products of one category
//! POST   /api/catalogue/refresh         - Re-fetch the catalogue document
//! GET    /api/works                     - Completed works
//!
//! # Basket
//! GET    /api/basket                    - Basket with totals
//! POST   /api/basket                    - Add a product (full record or {id})
//! DELETE /api/basket                    - Empty the basket
//! GET    /api/basket/count              - Count badge
//! POST   /api/basket/{id}/increment     - One more
//! POST   /api/basket/{id}/decrement     - One less
//! DELETE /api/basket/{id}               - Remove the line
//!
//! # Preferences
//! GET    /api/preferences/theme         - Current theme
//! POST   /api/preferences/theme/toggle  - Flip the theme
//!
//! # Contact
//! GET    /api/contact/callback          - Last call-back request (prefill)
//! POST   /api/contact/callback          - Call-back request
//! ```

pub mod basket;
pub mod catalogue;
pub mod contact;
pub mod health;
pub mod preferences;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalogue routes router.
pub fn catalogue_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalogue::index))
        .route("/refresh", post(catalogue::refresh))
        .route("/{category}", get(catalogue::show))
}

/// Create the basket routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(basket::show).post(basket::add).delete(basket::clear),
        )
        .route("/count", get(basket::count))
        .route("/{id}", axum::routing::delete(basket::remove))
        .route("/{id}/increment", post(basket::increment))
        .route("/{id}/decrement", post(basket::decrement))
}

/// Create the preference routes router.
pub fn preference_routes() -> Router<AppState> {
    Router::new()
        .route("/theme", get(preferences::theme))
        .route("/theme/toggle", post(preferences::toggle_theme))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Catalogue
        .nest("/api/catalogue", catalogue_routes())
        .route("/api/works", get(catalogue::works))
        // Basket
        .nest("/api/basket", basket_routes())
        // Preferences
        .nest("/api/preferences", preference_routes())
        // Contact
        .route(
            "/api/contact/callback",
            get(contact::prefill).post(contact::callback),
        )
}
