//! Service initialization and application state setup

use anyhow::Result;
use bindery_core::Config;
use bindery_services::{
    create_bucket_cover_host, create_catalog_repository, create_cdn_cover_host, AssetBackends,
    BookAssetService, IngestSettings, RemoteAssetStore,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::{AppState, AssetState, DbState};

/// Initialize all services and repositories, returning the application state
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    backends: AssetBackends,
    remote: Option<Arc<RemoteAssetStore>>,
) -> Result<Arc<AppState>> {
    tracing::info!("Initializing catalog repository...");
    let catalog = create_catalog_repository(pool.clone());

    let cdn_covers = create_cdn_cover_host(config)?;
    let bucket_covers = create_bucket_cover_host(remote);

    let service = Arc::new(BookAssetService::new(
        catalog,
        backends,
        cdn_covers,
        bucket_covers,
        IngestSettings::from_config(config),
    ));

    let state = Arc::new(AppState {
        db: DbState { pool },
        assets: AssetState {
            service,
            book_content_type: config.book_content_type().to_string(),
        },
        config: config.clone(),
        is_production: config.is_production(),
    });

    tracing::info!("Services initialized successfully");
    Ok(state)
}
