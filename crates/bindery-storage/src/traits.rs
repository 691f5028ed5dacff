//! Storage abstraction trait
//!
//! This module defines the AssetStore trait that both storage backends implement.

use async_trait::async_trait;
use bindery_core::models::{PrimaryUpload, UploadGrant};
use bindery_core::{AppError, UploadMethod};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            StorageError::InvalidKey(msg) => {
                AppError::InvalidInput(format!("Invalid storage key: {}", msg))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Outcome of placing a book artifact with a backend.
#[derive(Debug)]
pub enum Placement {
    /// The bytes are durably stored; the record can point at them immediately.
    Stored,
    /// A time-limited upload grant the client must complete. The record is
    /// updated before the bytes arrive; until the client finishes the PUT,
    /// the record points at an object that does not exist yet.
    Granted(UploadGrant),
}

/// A URL through which a stored artifact can be fetched.
///
/// Remote backends sign their URLs and report when the signature lapses;
/// the local backend serves through the API and its URLs do not expire.
#[derive(Debug, Clone)]
pub struct AccessUrl {
    pub url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Storage abstraction trait
///
/// Both backends (local filesystem, S3) implement this trait so the ingest
/// workflow can run the same step sequence regardless of where the bytes
/// live. Keys are produced by `bindery_core::naming::asset_key` and are flat
/// sanitized filenames; backends still validate them defensively.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// The upload method this backend serves.
    fn method(&self) -> UploadMethod;

    /// Place the book artifact under `key`.
    ///
    /// The local backend writes `upload.data` to disk and returns
    /// [`Placement::Stored`]; it fails when the request carried no bytes.
    /// The remote backend ignores any inline bytes and returns
    /// [`Placement::Granted`] with a presigned PUT URL valid for `grant_ttl`.
    async fn place(
        &self,
        key: &str,
        upload: &PrimaryUpload,
        grant_ttl: Duration,
    ) -> StorageResult<Placement>;

    /// Fetch the full artifact bytes for `key`.
    async fn read(&self, key: &str) -> StorageResult<Bytes>;

    /// Check whether an artifact exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Remove the artifact under `key`.
    ///
    /// Deletion strictness is part of each backend's contract: local fails
    /// with [`StorageError::NotFound`] when the file is absent, remote treats
    /// an absent object as already deleted. See the crate root documentation.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// A URL through which the artifact can be fetched, signed and
    /// time-limited where the backend supports it.
    async fn access_url(&self, key: &str, expires_in: Duration) -> StorageResult<AccessUrl>;
}
