//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`, and to avoid a single god object.

use bindery_core::Config;
use bindery_services::BookAssetService;
use sqlx::PgPool;
use std::sync::Arc;

// ----- Sub-state types -----

/// Database pool, kept for readiness probes; repositories live inside the
/// asset service.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
}

/// The book asset coordinator plus the bits of config the book handlers
/// need when building responses.
#[derive(Clone)]
pub struct AssetState {
    pub service: Arc<BookAssetService>,
    /// Content type served on primary-artifact downloads
    pub book_content_type: String,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub assets: AssetState,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for AssetState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.assets.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
