use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::upload_method::UploadMethod;

/// Identity of the primary artifact as persisted on the record.
///
/// `id` is the storage key in the backend implied by the record's upload
/// method; `size` is the human-formatted byte count shown to readers. An empty
/// `id` means no artifact has been attached yet (only ever the case inside the
/// create path, before the storage step runs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileInfo {
    /// Storage key of the primary artifact
    pub id: String,
    /// Human-formatted byte count, e.g. "500 KB"
    pub size: String,
}

impl FileInfo {
    pub fn empty() -> Self {
        Self {
            id: String::new(),
            size: String::new(),
        }
    }
}

/// Cover image handle: `id` is whatever the hosting backend needs to delete
/// the image later (CDN public id or bucket key), `url` the externally
/// fetchable address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CoverInfo {
    /// Backend-specific deletion handle
    pub id: String,
    /// Externally fetchable image URL
    pub url: String,
}

/// A catalog record for one e-book.
///
/// `file_info` and `cover` are only ever mutated by the asset coordinator
/// after the corresponding storage operation succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    /// Owning author; replace operations are rejected for other principals
    pub author_id: Uuid,
    pub title: String,
    /// URL slug derived from title and id, re-derived when the title changes
    pub slug: String,
    /// The last-used upload method; decides which backend `file_info.id`
    /// lives in and how reads are served
    pub upload_method: UploadMethod,
    pub file_info: FileInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Rows store the nested structs flattened: file_info as file_key/file_size,
// cover as nullable cover_id/cover_url set together or not at all.
#[cfg(feature = "sqlx")]
impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Book {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let cover_id: Option<String> = row.try_get("cover_id")?;
        let cover_url: Option<String> = row.try_get("cover_url")?;
        let cover = match (cover_id, cover_url) {
            (Some(id), Some(url)) => Some(CoverInfo { id, url }),
            _ => None,
        };

        Ok(Book {
            id: row.try_get("id")?,
            author_id: row.try_get("author_id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            upload_method: row.try_get("upload_method")?,
            file_info: FileInfo {
                id: row.try_get("file_key")?,
                size: row.try_get("file_size")?,
            },
            cover,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
