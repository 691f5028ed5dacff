use crate::traits::{AccessUrl, AssetStore, Placement, StorageError, StorageResult};
use async_trait::async_trait;
use bindery_core::models::{PrimaryUpload, UploadGrant};
use bindery_core::UploadMethod;
use bytes::Bytes;
use chrono::Utc;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;

/// S3 storage implementation
///
/// Book artifacts live in a private bucket and are only reachable through
/// presigned URLs; cover images go to the public bucket so a CDN or plain
/// HTTPS can serve them without signatures.
#[derive(Clone)]
pub struct RemoteAssetStore {
    private: AmazonS3,
    public: AmazonS3,
    private_bucket: String,
    public_bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl RemoteAssetStore {
    /// Create a new RemoteAssetStore instance
    ///
    /// # Arguments
    /// * `private_bucket` - Bucket for book artifacts (presigned access only)
    /// * `public_bucket` - Bucket for cover images (world-readable)
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        private_bucket: String,
        public_bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let private = build_store(&private_bucket, &region, endpoint_url.as_deref())?;
        let public = build_store(&public_bucket, &region, endpoint_url.as_deref())?;

        Ok(RemoteAssetStore {
            private,
            public,
            private_bucket,
            public_bucket,
            region,
            endpoint_url,
        })
    }

    /// Upload cover bytes directly to the public bucket and return the
    /// object's public URL.
    pub async fn put_public(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.public.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.public_bucket,
                key = %key,
                content_type = %content_type,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 public upload failed"
            );
            StorageError::WriteFailed(e.to_string())
        })?;

        let url = object_url(self.endpoint_url.as_deref(), &self.public_bucket, &self.region, key);

        tracing::info!(
            bucket = %self.public_bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 public upload successful"
        );

        Ok(url)
    }

    /// Remove a cover object from the public bucket. Best-effort like
    /// `delete`: a missing object is success.
    pub async fn delete_public(&self, key: &str) -> StorageResult<()> {
        delete_from(&self.public, &self.public_bucket, key).await
    }
}

fn build_store(bucket: &str, region: &str, endpoint_url: Option<&str>) -> StorageResult<AmazonS3> {
    // Build AmazonS3 object store from environment and explicit settings.
    let mut builder = AmazonS3Builder::from_env()
        .with_region(region.to_string())
        .with_bucket_name(bucket.to_string());

    if let Some(endpoint) = endpoint_url {
        let allow_http = endpoint.starts_with("http://");
        builder = builder
            .with_endpoint(endpoint.to_string())
            .with_allow_http(allow_http);
    }

    builder
        .build()
        .map_err(|e| StorageError::ConfigError(e.to_string()))
}

/// Public URL for an object.
///
/// For AWS S3, uses the virtual-hosted format
/// `https://{bucket}.s3.{region}.amazonaws.com/{key}`. For S3-compatible
/// providers, uses path-style URLs under the configured endpoint.
fn object_url(endpoint_url: Option<&str>, bucket: &str, region: &str, key: &str) -> String {
    match endpoint_url {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

async fn delete_from(store: &AmazonS3, bucket: &str, key: &str) -> StorageResult<()> {
    let start = std::time::Instant::now();
    let location = Path::from(key.to_string());

    let result: ObjectResult<_> = store.delete(&location).await;

    match result {
        Ok(()) => {
            tracing::info!(
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete successful"
            );
            Ok(())
        }
        Err(ObjectStoreError::NotFound { .. }) => {
            tracing::debug!(
                bucket = %bucket,
                key = %key,
                "S3 object already absent, treating delete as success"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            Err(StorageError::DeleteFailed(e.to_string()))
        }
    }
}

#[async_trait]
impl AssetStore for RemoteAssetStore {
    fn method(&self) -> UploadMethod {
        UploadMethod::Remote
    }

    /// Issue a presigned PUT grant instead of accepting bytes.
    ///
    /// The caller's record is updated before the client completes the PUT,
    /// so between grant and upload the record points at an object that does
    /// not exist yet. Readers see that as a 404 from S3 until the upload
    /// lands.
    async fn place(
        &self,
        key: &str,
        upload: &PrimaryUpload,
        grant_ttl: Duration,
    ) -> StorageResult<Placement> {
        let location = Path::from(key.to_string());

        let url_result: ObjectResult<_> = self
            .private
            .signed_url(Method::PUT, &location, grant_ttl)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(format!("Failed to sign upload URL: {}", e)))?
            .to_string();

        let ttl = chrono::Duration::from_std(grant_ttl)
            .map_err(|e| StorageError::BackendError(format!("Invalid grant TTL: {}", e)))?;
        let expires_at = Utc::now() + ttl;

        tracing::info!(
            bucket = %self.private_bucket,
            key = %key,
            content_type = %upload.content_type,
            declared_size_bytes = upload.size,
            expires_in_secs = grant_ttl.as_secs(),
            "Issued presigned upload URL"
        );

        Ok(Placement::Granted(UploadGrant { url, expires_at }))
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.private.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.private_bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 read failed"
                );
                StorageError::ReadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        let size = bytes.len() as u64;

        tracing::info!(
            bucket = %self.private_bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 read successful"
        );

        Ok(bytes)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.private.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    /// Best-effort delete: a missing object counts as already deleted.
    ///
    /// With presigned uploads the object a record points at may never have
    /// been uploaded, so an absent key during replace is normal rather than
    /// a divergence.
    async fn delete(&self, key: &str) -> StorageResult<()> {
        delete_from(&self.private, &self.private_bucket, key).await
    }

    async fn access_url(&self, key: &str, expires_in: Duration) -> StorageResult<AccessUrl> {
        let location = Path::from(key.to_string());

        let url_result: ObjectResult<_> = self
            .private
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(format!("Failed to sign read URL: {}", e)))?
            .to_string();

        let ttl = chrono::Duration::from_std(expires_in)
            .map_err(|e| StorageError::BackendError(format!("Invalid expiry: {}", e)))?;

        Ok(AccessUrl {
            url,
            expires_at: Some(Utc::now() + ttl),
        })
    }
}
