//! Cover image hosting.
//!
//! Covers are public by design. Books ingested with the local method push
//! their covers to the image CDN (Cloudinary); books on the remote method
//! keep them in the public bucket next to the private artifacts. Both hosts
//! hand back a [`CoverInfo`] whose `id` is the handle a later destroy needs
//! (CDN public id or bucket key).

use anyhow::{Context, Result};
use async_trait::async_trait;
use bindery_core::models::CoverInfo;
use bindery_core::{AppError, Config};
use bindery_storage::RemoteAssetStore;
use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Hosting backend for cover images.
#[async_trait]
pub trait CoverHost: Send + Sync {
    /// Host the image bytes and return the handle to store on the record.
    ///
    /// `key_hint` names the upload where the backend lets us choose (bucket
    /// key, CDN file name); the returned `CoverInfo::id` is authoritative.
    async fn upload(
        &self,
        key_hint: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<CoverInfo, AppError>;

    /// Remove a previously hosted image by its handle.
    async fn destroy(&self, cover_id: &str) -> Result<(), AppError>;
}

/// Cloudinary request signature: parameters sorted by name, joined as
/// `name=value` pairs with `&`, the API secret appended, SHA-256, hex.
/// Cloudinary accepts both SHA-1 and SHA-256 digests.
fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);

    let to_sign = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryDestroyResponse {
    result: String,
}

/// Cover host backed by the Cloudinary image API, using signed uploads.
pub struct CloudinaryCovers {
    http_client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    upload_preset: String,
}

impl CloudinaryCovers {
    pub fn new(
        cloud_name: &str,
        api_key: &str,
        api_secret: &str,
        upload_preset: &str,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client for Cloudinary")?;

        Ok(Self {
            http_client,
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            upload_preset: upload_preset.to_string(),
        })
    }

    fn api_url(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.cloud_name, action
        )
    }
}

#[async_trait]
impl CoverHost for CloudinaryCovers {
    async fn upload(
        &self,
        key_hint: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<CoverInfo, AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let params = [
            ("timestamp", timestamp.clone()),
            ("upload_preset", self.upload_preset.clone()),
        ];
        let signature = sign_params(&params, &self.api_secret);

        let file_part = multipart::Part::bytes(data.to_vec())
            .file_name(key_hint.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::InvalidAsset(format!("Invalid cover content type: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("upload_preset", self.upload_preset.clone())
            .text("signature", signature);

        let response = self
            .http_client
            .post(self.api_url("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Cloudinary upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Storage(format!(
                "Cloudinary upload failed: {} - {}",
                status, error_text
            )));
        }

        let uploaded: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to parse Cloudinary response: {}", e)))?;

        tracing::info!(
            public_id = %uploaded.public_id,
            "Cover uploaded to Cloudinary"
        );

        Ok(CoverInfo {
            id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, cover_id: &str) -> Result<(), AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let params = [
            ("public_id", cover_id.to_string()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = sign_params(&params, &self.api_secret);

        let response = self
            .http_client
            .post(self.api_url("destroy"))
            .form(&[
                ("public_id", cover_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Cloudinary destroy request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Storage(format!(
                "Cloudinary destroy failed: {} - {}",
                status, error_text
            )));
        }

        let outcome: CloudinaryDestroyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to parse Cloudinary response: {}", e)))?;

        // "not found" means the image is already gone
        match outcome.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(AppError::Storage(format!(
                "Cloudinary destroy returned '{}' for {}",
                other, cover_id
            ))),
        }
    }
}

/// Cover host for remote-method books: the public bucket of the remote
/// backend, keyed by the hint the coordinator derives.
pub struct BucketCovers {
    store: Arc<RemoteAssetStore>,
}

impl BucketCovers {
    pub fn new(store: Arc<RemoteAssetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CoverHost for BucketCovers {
    async fn upload(
        &self,
        key_hint: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<CoverInfo, AppError> {
        let url = self.store.put_public(key_hint, data, content_type).await?;
        Ok(CoverInfo {
            id: key_hint.to_string(),
            url,
        })
    }

    async fn destroy(&self, cover_id: &str) -> Result<(), AppError> {
        self.store.delete_public(cover_id).await?;
        Ok(())
    }
}

/// Placeholder used when no CDN credentials are configured. Uploads fail and
/// the coordinator degrades to a record without a cover; destroys are no-ops
/// so replacements never block on an image that was never hosted.
pub struct DisabledCovers;

#[async_trait]
impl CoverHost for DisabledCovers {
    async fn upload(
        &self,
        _key_hint: &str,
        _content_type: &str,
        _data: Bytes,
    ) -> Result<CoverInfo, AppError> {
        Err(AppError::Storage(
            "Cover hosting is not configured".to_string(),
        ))
    }

    async fn destroy(&self, cover_id: &str) -> Result<(), AppError> {
        tracing::warn!(
            cover_id = %cover_id,
            "Cover hosting is not configured; skipping destroy"
        );
        Ok(())
    }
}

/// Build the CDN cover host from configuration, falling back to the disabled
/// placeholder when credentials are missing so local-method ingest keeps
/// working without covers.
pub fn create_cdn_cover_host(config: &Config) -> Result<Arc<dyn CoverHost>> {
    match (
        config.cloudinary_cloud_name(),
        config.cloudinary_api_key(),
        config.cloudinary_api_secret(),
        config.cloudinary_upload_preset(),
    ) {
        (Some(cloud_name), Some(api_key), Some(api_secret), Some(upload_preset)) => {
            let host = CloudinaryCovers::new(cloud_name, api_key, api_secret, upload_preset)?;
            Ok(Arc::new(host))
        }
        _ => {
            tracing::warn!("Cloudinary is not configured; covers for local-method books are disabled");
            Ok(Arc::new(DisabledCovers))
        }
    }
}

/// Wrap the remote backend's public bucket as a cover host, when remote
/// storage is configured at all.
pub fn create_bucket_cover_host(store: Option<Arc<RemoteAssetStore>>) -> Option<Arc<dyn CoverHost>> {
    store.map(|s| Arc::new(BucketCovers::new(s)) as Arc<dyn CoverHost>)
}
