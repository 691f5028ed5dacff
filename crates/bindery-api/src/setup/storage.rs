//! Storage setup and initialization

use anyhow::Result;
use bindery_core::Config;
use bindery_services::{
    create_local_store, create_remote_store, AssetBackends, AssetStore, RemoteAssetStore,
};
use std::sync::Arc;

/// Setup the storage backends for both upload methods.
///
/// The remote store is also returned on its own: the cover host for
/// remote-method books writes to its public bucket.
pub async fn setup_storage(
    config: &Config,
) -> Result<(AssetBackends, Option<Arc<RemoteAssetStore>>)> {
    tracing::info!("Initializing storage backends...");
    let local = create_local_store(config).await?;
    let remote = create_remote_store(config).await?;

    tracing::info!(
        local = local.is_some(),
        remote = remote.is_some(),
        "Storage backends initialized"
    );

    let backends = AssetBackends::new(
        local.map(|s| s as Arc<dyn AssetStore>),
        remote.clone().map(|s| s as Arc<dyn AssetStore>),
    )?;

    Ok((backends, remote))
}
