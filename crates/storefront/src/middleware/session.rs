//! Session middleware configuration.
//!
//! Sessions are held in a bounded in-memory cache and carry only the visitor
//! id; the visitor's basket and preferences live in their on-disk store.
//! Records leave the cache when their expiry passes or, once the cache is
//! full, when they are the least recently used.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mebel_session";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Session store holding at most `capacity` records.
#[must_use]
pub fn create_session_store(capacity: u64) -> MokaStore {
    MokaStore::new(Some(capacity))
}

/// Create the session layer over a bounded in-memory store.
///
/// # Arguments
///
/// * `config` - Storefront configuration (cookie `Secure` flag, store capacity)
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(create_session_store(config.session_capacity))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
