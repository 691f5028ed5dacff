use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Book;

/// Descriptive fields for a record about to be created.
#[derive(Debug, Clone, Validate)]
pub struct BookDraft {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,
}

/// Mutations accepted by the replace path alongside new assets.
#[derive(Debug, Clone, Default, Validate)]
pub struct BookChanges {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: Option<String>,
}

/// The primary artifact as submitted with one request. Ephemeral; consumed
/// by the coordinator and never persisted.
///
/// On the local method the bytes travel with the request (`data` is set and
/// `size` equals its length). On the remote method only the declared metadata
/// arrives; the bytes go client-side through a presigned grant.
#[derive(Debug, Clone)]
pub struct PrimaryUpload {
    /// Client-declared MIME type, validated strictly by the coordinator
    pub content_type: String,
    /// Declared byte count (actual length when `data` is present)
    pub size: u64,
    /// Artifact bytes, present for the local method only
    pub data: Option<Bytes>,
}

impl PrimaryUpload {
    /// Bytes received with the request (local method).
    pub fn inline(content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            content_type: content_type.into(),
            size: data.len() as u64,
            data: Some(data),
        }
    }

    /// Metadata only; the client uploads the bytes through a grant
    /// (remote method).
    pub fn declared(content_type: impl Into<String>, size: u64) -> Self {
        Self {
            content_type: content_type.into(),
            size,
            data: None,
        }
    }
}

/// A cover image as submitted with one request. Cover bytes always travel
/// with the request, on both methods.
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub content_type: String,
    pub data: Bytes,
}

/// Time-bounded permission for the client to PUT the primary artifact
/// directly into the private bucket. Its existence is not proof the upload
/// ever completes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadGrant {
    /// Presigned PUT URL
    pub url: String,
    /// When the grant stops working
    pub expires_at: DateTime<Utc>,
}

/// Outcome of the create path.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub book: Book,
    /// Set on the remote method; the caller completes the upload out of band
    pub upload_grant: Option<UploadGrant>,
    /// Storage key assigned to the primary artifact
    pub assigned_key: String,
}

/// Outcome of the replace path.
#[derive(Debug, Clone)]
pub struct ReplaceOutcome {
    pub book: Book,
    /// Set when a new remote grant was issued for a replacement artifact
    pub upload_grant: Option<UploadGrant>,
}

/// Response body for create and replace.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookUploadResponse {
    pub book: Book,
    /// Present on the remote method: PUT the artifact bytes here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    /// Expiry of `upload_url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl BookUploadResponse {
    pub fn new(book: Book, grant: Option<UploadGrant>) -> Self {
        let (upload_url, expires_at) = match grant {
            Some(g) => (Some(g.url), Some(g.expires_at)),
            None => (None, None),
        };
        Self {
            book,
            upload_url,
            expires_at,
        }
    }
}

/// Response body for the read-access endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessUrlResponse {
    /// Where the owner can fetch the primary artifact
    pub url: String,
    /// Set for signed remote URLs; local URLs do not expire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
