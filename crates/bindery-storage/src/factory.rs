use crate::local::LocalAssetStore;
use crate::s3::RemoteAssetStore;
use crate::traits::{AssetStore, StorageError, StorageResult};
use bindery_core::{Config, UploadMethod};
use std::sync::Arc;

/// The storage backends provisioned at startup, one per upload method.
///
/// A deployment may run with only one of the two configured; [`select`]
/// refuses methods that have no backend behind them.
///
/// [`select`]: AssetBackends::select
#[derive(Clone)]
pub struct AssetBackends {
    local: Option<Arc<dyn AssetStore>>,
    remote: Option<Arc<dyn AssetStore>>,
}

impl AssetBackends {
    pub fn new(
        local: Option<Arc<dyn AssetStore>>,
        remote: Option<Arc<dyn AssetStore>>,
    ) -> StorageResult<Self> {
        if local.is_none() && remote.is_none() {
            return Err(StorageError::ConfigError(
                "At least one storage backend must be configured".to_string(),
            ));
        }
        Ok(AssetBackends { local, remote })
    }

    /// Resolve the backend for an upload method.
    ///
    /// Chosen once per request; every storage step of that request goes
    /// through the handle this returns.
    pub fn select(&self, method: UploadMethod) -> StorageResult<Arc<dyn AssetStore>> {
        let store = match method {
            UploadMethod::Local => self.local.as_ref(),
            UploadMethod::Remote => self.remote.as_ref(),
        };

        store.cloned().ok_or_else(|| {
            StorageError::ConfigError(format!(
                "No storage backend configured for {} uploads",
                method
            ))
        })
    }

    pub fn supports(&self, method: UploadMethod) -> bool {
        match method {
            UploadMethod::Local => self.local.is_some(),
            UploadMethod::Remote => self.remote.is_some(),
        }
    }
}

/// Create the local filesystem backend if the configuration enables it.
pub async fn create_local_store(config: &Config) -> StorageResult<Option<Arc<LocalAssetStore>>> {
    if !config.local_backend_configured() {
        return Ok(None);
    }

    let base_path = config
        .local_storage_path()
        .map(String::from)
        .ok_or_else(|| {
            StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
        })?;
    let base_url = config
        .local_storage_base_url()
        .map(String::from)
        .ok_or_else(|| {
            StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
        })?;

    let store = LocalAssetStore::new(base_path, base_url).await?;
    Ok(Some(Arc::new(store)))
}

/// Create the S3 backend pair if the configuration enables it.
pub async fn create_remote_store(config: &Config) -> StorageResult<Option<Arc<RemoteAssetStore>>> {
    if !config.remote_backend_configured() {
        return Ok(None);
    }

    let private_bucket = config
        .s3_private_bucket()
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError("S3_PRIVATE_BUCKET not configured".to_string()))?;
    let public_bucket = config
        .s3_public_bucket()
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError("S3_PUBLIC_BUCKET not configured".to_string()))?;
    let region = config
        .s3_region()
        .map(String::from)
        .or_else(|| config.aws_region().map(String::from))
        .ok_or_else(|| {
            StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
        })?;
    let endpoint = config.s3_endpoint().map(String::from);

    let store = RemoteAssetStore::new(private_bucket, public_bucket, region, endpoint).await?;
    Ok(Some(Arc::new(store)))
}
