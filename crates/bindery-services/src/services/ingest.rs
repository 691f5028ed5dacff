//! Book asset coordination.
//!
//! One service carries the dual-path ingest workflow: create a catalog record
//! together with its primary artifact (and optional cover), replace assets on
//! an existing record, and serve reads. The storage backend is selected once
//! per request from the upload method and every step of that request goes
//! through the selected handle. Each catalog mutation is a single repository
//! write, issued only after the storage work it reports on has succeeded; the
//! remote method is the deliberate exception, where the record points at an
//! object the client has yet to upload.

use std::sync::Arc;
use std::time::Duration;

use bindery_core::models::{
    Book, BookChanges, BookDraft, CoverInfo, CoverUpload, FileInfo, IngestOutcome, PrimaryUpload,
    ReplaceOutcome,
};
use bindery_core::naming::{asset_key, format_byte_size, record_slug};
use bindery_core::{AppError, Config, UploadMethod};
use bindery_db::{BookPatch, CatalogRepository};
use bindery_storage::{AccessUrl, AssetBackends, AssetStore, Placement};
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::services::covers::CoverHost;

/// Extension appended to every primary artifact key.
pub const BOOK_EXTENSION: &str = "epub";
/// Extension appended to every cover key hint.
pub const COVER_EXTENSION: &str = "png";

/// Tunables for the ingest workflow.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Lifetime of presigned PUT grants issued on the remote method
    pub grant_ttl: Duration,
    /// Lifetime of signed read URLs
    pub read_ttl: Duration,
    /// The only content type accepted for the primary artifact
    pub book_content_type: String,
    pub max_book_size_bytes: u64,
    pub max_cover_size_bytes: u64,
}

impl IngestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grant_ttl: Duration::from_secs(config.upload_grant_ttl_secs()),
            read_ttl: Duration::from_secs(config.read_url_ttl_secs()),
            book_content_type: config.book_content_type().to_string(),
            max_book_size_bytes: config.max_book_size_bytes() as u64,
            max_cover_size_bytes: config.max_cover_size_bytes() as u64,
        }
    }
}

/// How the primary artifact reaches the caller on a download request.
#[derive(Debug)]
pub enum ArtifactDelivery {
    /// Local method: the API serves the bytes itself.
    Bytes { book: Book, data: Bytes },
    /// Remote method: the caller follows a signed URL.
    Redirect { url: String },
}

/// Coordinator for book records and their physical assets.
pub struct BookAssetService {
    catalog: Arc<dyn CatalogRepository>,
    backends: AssetBackends,
    /// CDN host for local-method covers
    cdn_covers: Arc<dyn CoverHost>,
    /// Public-bucket host for remote-method covers; absent when remote
    /// storage is not configured
    bucket_covers: Option<Arc<dyn CoverHost>>,
    settings: IngestSettings,
}

impl BookAssetService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        backends: AssetBackends,
        cdn_covers: Arc<dyn CoverHost>,
        bucket_covers: Option<Arc<dyn CoverHost>>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            catalog,
            backends,
            cdn_covers,
            bucket_covers,
            settings,
        }
    }

    /// Create a catalog record and place its primary artifact.
    ///
    /// Local method: the bytes are written before the record exists, so a
    /// storage failure leaves no record behind. Remote method: a presigned
    /// PUT grant is issued and the record is persisted pointing at the
    /// not-yet-uploaded object. The cover is best-effort on both paths; a
    /// cover failure never loses a book whose artifact was already placed.
    #[tracing::instrument(
        skip(self, draft, primary, cover),
        fields(author_id = %author_id, method = %method, operation = "create_book")
    )]
    pub async fn create_asset(
        &self,
        author_id: Uuid,
        method: UploadMethod,
        draft: BookDraft,
        primary: PrimaryUpload,
        cover: Option<CoverUpload>,
    ) -> Result<IngestOutcome, AppError> {
        draft.validate()?;
        self.validate_primary(&primary)?;
        validate_method_fit(method, &primary)?;
        let store = self.select_store(method)?;

        // Key and slug derive from the id the record will be persisted under.
        let id = Uuid::new_v4();
        let key = asset_key(&id.to_string(), &draft.title, BOOK_EXTENSION)?;

        let placement = store
            .place(&key, &primary, self.settings.grant_ttl)
            .await?;

        let now = Utc::now();
        let mut book = Book {
            id,
            author_id,
            title: draft.title.clone(),
            slug: record_slug(&draft.title, &id.to_string()),
            upload_method: method,
            file_info: FileInfo {
                id: key.clone(),
                size: format_byte_size(primary.size),
            },
            cover: None,
            created_at: now,
            updated_at: now,
        };

        if let Some(cover) = cover {
            book.cover = self.attach_cover(method, id, &draft.title, cover).await;
        }

        let book = self.catalog.insert(&book).await?;

        tracing::info!(
            book_id = %book.id,
            key = %key,
            size = %book.file_info.size,
            "Book created"
        );

        let upload_grant = match placement {
            Placement::Stored => None,
            Placement::Granted(grant) => Some(grant),
        };

        Ok(IngestOutcome {
            book,
            upload_grant,
            assigned_key: key,
        })
    }

    /// Replace assets and/or metadata on an existing record.
    ///
    /// A new primary artifact retires the old one first, then places the
    /// replacement under a key derived from the effective title. A new cover
    /// destroys the previous image before hosting the replacement; cover
    /// problems are logged and the record keeps its previous cover pointer.
    /// All resulting mutations land in one catalog update.
    #[tracing::instrument(
        skip(self, changes, primary, cover),
        fields(author_id = %author_id, book_id = %book_id, operation = "replace_book_assets")
    )]
    pub async fn replace_asset(
        &self,
        author_id: Uuid,
        book_id: Uuid,
        method: Option<UploadMethod>,
        changes: BookChanges,
        primary: Option<PrimaryUpload>,
        cover: Option<CoverUpload>,
    ) -> Result<ReplaceOutcome, AppError> {
        changes.validate()?;
        let book = self.owned_book(author_id, book_id).await?;

        // The record's method decides which backend its artifact lives in;
        // switching methods would strand the bytes in the old backend.
        if let Some(requested) = method {
            if requested != book.upload_method {
                return Err(AppError::InvalidAsset(
                    "The upload method of an existing book cannot be changed".to_string(),
                ));
            }
        }
        let method = book.upload_method;

        let mut patch = BookPatch::default();
        let mut upload_grant = None;

        // Title first: a replacement artifact is keyed under the effective title.
        let title = changes.title.clone().unwrap_or_else(|| book.title.clone());
        if let Some(new_title) = changes.title {
            patch.slug = Some(record_slug(&new_title, &book.id.to_string()));
            patch.title = Some(new_title);
        }

        if let Some(primary) = primary {
            self.validate_primary(&primary)?;
            // Checked before retiring: a mismatched request must not cost
            // the record its current artifact.
            validate_method_fit(method, &primary)?;
            let store = self.select_store(method)?;

            self.retire_primary(&store, &book).await?;

            let key = asset_key(&book.id.to_string(), &title, BOOK_EXTENSION)?;
            let placement = match store.place(&key, &primary, self.settings.grant_ttl).await {
                Ok(placement) => placement,
                Err(e) => {
                    // The old artifact is already gone and the record still
                    // names it. Nothing to roll back to; surface the failure.
                    tracing::error!(
                        book_id = %book.id,
                        old_key = %book.file_info.id,
                        new_key = %key,
                        error = %e,
                        "Replacement write failed after the old artifact was retired"
                    );
                    return Err(e.into());
                }
            };

            if let Placement::Granted(grant) = placement {
                upload_grant = Some(grant);
            }

            tracing::info!(
                book_id = %book.id,
                old_key = %book.file_info.id,
                new_key = %key,
                "Primary artifact replaced"
            );

            patch.file_info = Some(FileInfo {
                id: key,
                size: format_byte_size(primary.size),
            });
        }

        if let Some(cover) = cover {
            if let Some(info) = self.replace_cover(method, &book, &title, cover).await {
                patch.cover = Some(info);
            }
        }

        let book = if patch.is_empty() {
            book
        } else {
            self.catalog.update(book.id, patch).await?
        };

        Ok(ReplaceOutcome { book, upload_grant })
    }

    /// Load a record by id. Metadata only; no ownership requirement.
    pub async fn fetch_book(&self, book_id: Uuid) -> Result<Book, AppError> {
        self.catalog
            .find_by_id(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))
    }

    /// A URL through which the owner can fetch the primary artifact.
    #[tracing::instrument(skip(self), fields(author_id = %author_id, book_id = %book_id))]
    pub async fn access_url(&self, author_id: Uuid, book_id: Uuid) -> Result<AccessUrl, AppError> {
        let book = self.owned_book(author_id, book_id).await?;
        if book.file_info.id.is_empty() {
            return Err(AppError::NotFound(format!(
                "Book {} has no stored file",
                book_id
            )));
        }

        let store = self.select_store(book.upload_method)?;
        let url = store
            .access_url(&book.file_info.id, self.settings.read_ttl)
            .await?;
        Ok(url)
    }

    /// Serve the primary artifact: local books stream through the API,
    /// remote books redirect to a signed URL.
    #[tracing::instrument(skip(self), fields(author_id = %author_id, book_id = %book_id))]
    pub async fn deliver_artifact(
        &self,
        author_id: Uuid,
        book_id: Uuid,
    ) -> Result<ArtifactDelivery, AppError> {
        let book = self.owned_book(author_id, book_id).await?;
        if book.file_info.id.is_empty() {
            return Err(AppError::NotFound(format!(
                "Book {} has no stored file",
                book_id
            )));
        }

        let store = self.select_store(book.upload_method)?;
        match book.upload_method {
            UploadMethod::Local => {
                let data = store.read(&book.file_info.id).await?;
                Ok(ArtifactDelivery::Bytes { book, data })
            }
            UploadMethod::Remote => {
                let access = store
                    .access_url(&book.file_info.id, self.settings.read_ttl)
                    .await?;
                Ok(ArtifactDelivery::Redirect { url: access.url })
            }
        }
    }

    /// Load a record and check ownership. Records owned by someone else read
    /// as absent rather than forbidden.
    async fn owned_book(&self, author_id: Uuid, book_id: Uuid) -> Result<Book, AppError> {
        let book = self.fetch_book(book_id).await?;
        if book.author_id != author_id {
            tracing::debug!(
                book_id = %book_id,
                author_id = %author_id,
                "Ownership check failed"
            );
            return Err(AppError::NotFound(format!("Book {} not found", book_id)));
        }
        Ok(book)
    }

    /// Strict equality on the declared content type; anything else is
    /// rejected before any storage work happens.
    fn validate_primary(&self, primary: &PrimaryUpload) -> Result<(), AppError> {
        if primary.content_type.to_lowercase() != self.settings.book_content_type {
            return Err(AppError::InvalidAsset(format!(
                "Invalid file type: expected {}, got {}",
                self.settings.book_content_type, primary.content_type
            )));
        }
        if primary.size == 0 {
            return Err(AppError::InvalidAsset("Book file is empty".to_string()));
        }
        if primary.size > self.settings.max_book_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Book file exceeds the maximum size of {}",
                format_byte_size(self.settings.max_book_size_bytes)
            )));
        }
        Ok(())
    }

    fn select_store(&self, method: UploadMethod) -> Result<Arc<dyn AssetStore>, AppError> {
        self.backends.select(method).map_err(|_| {
            AppError::InvalidAsset(format!(
                "{} uploads are not enabled on this server",
                method
            ))
        })
    }

    /// Remove the record's current primary artifact ahead of a replacement.
    ///
    /// Local: the file must exist and delete cleanly or the whole replace
    /// stops here, before anything else is touched. Remote: a failed delete
    /// is logged and the replacement proceeds; at worst the old object is
    /// orphaned in the bucket.
    async fn retire_primary(
        &self,
        store: &Arc<dyn AssetStore>,
        book: &Book,
    ) -> Result<(), AppError> {
        let old_key = book.file_info.id.as_str();
        if old_key.is_empty() {
            // Nothing was ever attached.
            return Ok(());
        }

        match book.upload_method {
            UploadMethod::Local => {
                store.delete(old_key).await?;
            }
            UploadMethod::Remote => {
                if let Err(e) = store.delete(old_key).await {
                    tracing::warn!(
                        book_id = %book.id,
                        key = %old_key,
                        error = %e,
                        "Failed to delete old remote artifact; continuing with replacement"
                    );
                }
            }
        }
        Ok(())
    }

    /// Host a cover image, degrading to no cover on failure. The primary
    /// artifact has already been placed and must not be lost to a bad image.
    async fn attach_cover(
        &self,
        method: UploadMethod,
        book_id: Uuid,
        title: &str,
        cover: CoverUpload,
    ) -> Option<CoverInfo> {
        match self.host_cover(method, book_id, title, cover).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(
                    book_id = %book_id,
                    error = %e,
                    "Cover upload failed; continuing without a cover"
                );
                None
            }
        }
    }

    async fn host_cover(
        &self,
        method: UploadMethod,
        book_id: Uuid,
        title: &str,
        cover: CoverUpload,
    ) -> Result<CoverInfo, AppError> {
        if !cover.content_type.to_lowercase().starts_with("image") {
            return Err(AppError::InvalidAsset(format!(
                "Cover must be an image, got {}",
                cover.content_type
            )));
        }
        if cover.data.len() as u64 > self.settings.max_cover_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Cover exceeds the maximum size of {}",
                format_byte_size(self.settings.max_cover_size_bytes)
            )));
        }

        let host = self.cover_host(method)?;
        let key_hint = asset_key(&book_id.to_string(), title, COVER_EXTENSION)?;
        host.upload(&key_hint, &cover.content_type, cover.data)
            .await
    }

    /// Swap the record's cover. The old image is destroyed first; destroy
    /// failures are logged and do not stop the new upload. Returns the new
    /// handle, or `None` when hosting failed; the cover column is never
    /// cleared, so a failed swap after a successful destroy leaves the record
    /// pointing at an image that no longer exists.
    async fn replace_cover(
        &self,
        method: UploadMethod,
        book: &Book,
        title: &str,
        cover: CoverUpload,
    ) -> Option<CoverInfo> {
        if let Some(old) = &book.cover {
            match self.cover_host(method) {
                Ok(host) => {
                    if let Err(e) = host.destroy(&old.id).await {
                        tracing::warn!(
                            book_id = %book.id,
                            cover_id = %old.id,
                            error = %e,
                            "Failed to destroy previous cover; its hosted copy may be orphaned"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        book_id = %book.id,
                        error = %e,
                        "No cover host available to destroy the previous cover"
                    );
                }
            }
        }

        let replacement = self.attach_cover(method, book.id, title, cover).await;
        if replacement.is_none() && book.cover.is_some() {
            tracing::error!(
                book_id = %book.id,
                "Replacement cover upload failed; the record still points at the destroyed cover"
            );
        }
        replacement
    }

    fn cover_host(&self, method: UploadMethod) -> Result<&Arc<dyn CoverHost>, AppError> {
        match method {
            UploadMethod::Local => Ok(&self.cdn_covers),
            UploadMethod::Remote => self.bucket_covers.as_ref().ok_or_else(|| {
                AppError::Storage("No public bucket configured for remote covers".to_string())
            }),
        }
    }
}

/// The local method carries bytes in the request; the remote method carries
/// declared metadata only. A request shaped for the wrong method is rejected
/// up front.
fn validate_method_fit(method: UploadMethod, primary: &PrimaryUpload) -> Result<(), AppError> {
    match method {
        UploadMethod::Local if primary.data.is_none() => Err(AppError::InvalidAsset(
            "Local uploads require the book file in the request".to_string(),
        )),
        UploadMethod::Remote if primary.data.is_some() => Err(AppError::InvalidAsset(
            "Remote uploads declare the book file; the bytes go through the upload URL".to_string(),
        )),
        _ => Ok(()),
    }
}
