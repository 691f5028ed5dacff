//! In-memory catalog, remote store, and cover host fakes. The local backend
//! in these tests is the real filesystem store over a temp directory; only
//! the seams that would need Postgres, S3, or a CDN are faked.

#![allow(dead_code)]

use async_trait::async_trait;
use bindery_core::models::{Book, CoverInfo, PrimaryUpload, UploadGrant};
use bindery_core::{AppError, UploadMethod};
use bindery_services::{
    AccessUrl, AssetStore, BookPatch, CatalogRepository, CoverHost, Placement, StorageError,
    StorageResult,
};
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Catalog repository over a `HashMap`, applying patches the way the
/// Postgres implementation does (None leaves a column untouched).
#[derive(Default)]
pub struct MemoryCatalog {
    books: Mutex<HashMap<Uuid, Book>>,
}

impl MemoryCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, id: Uuid) -> Option<Book> {
        self.books.lock().unwrap().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.books.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn insert(&self, book: &Book) -> Result<Book, AppError> {
        self.books.lock().unwrap().insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, AppError> {
        Ok(self.books.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: BookPatch) -> Result<Book, AppError> {
        let mut books = self.books.lock().unwrap();
        let book = books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(slug) = patch.slug {
            book.slug = slug;
        }
        if let Some(file_info) = patch.file_info {
            book.file_info = file_info;
        }
        if let Some(cover) = patch.cover {
            book.cover = Some(cover);
        }
        book.updated_at = Utc::now();
        Ok(book.clone())
    }
}

/// Remote backend that issues grants without a bucket behind it. Objects are
/// never considered uploaded, matching a client that has not completed its
/// PUT yet.
#[derive(Default)]
pub struct GrantingRemoteStore {
    grants: Mutex<Vec<String>>,
}

impl GrantingRemoteStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn granted_keys(&self) -> Vec<String> {
        self.grants.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for GrantingRemoteStore {
    fn method(&self) -> UploadMethod {
        UploadMethod::Remote
    }

    async fn place(
        &self,
        key: &str,
        _upload: &PrimaryUpload,
        grant_ttl: Duration,
    ) -> StorageResult<Placement> {
        self.grants.lock().unwrap().push(key.to_string());
        Ok(Placement::Granted(UploadGrant {
            url: format!("https://grants.test/{}", key),
            expires_at: Utc::now() + chrono::Duration::from_std(grant_ttl).unwrap_or_default(),
        }))
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        // Remote deletes treat an absent object as already deleted.
        Ok(())
    }

    async fn access_url(&self, key: &str, expires_in: Duration) -> StorageResult<AccessUrl> {
        Ok(AccessUrl {
            url: format!("https://reads.test/{}?sig=test", key),
            expires_at: Some(
                Utc::now() + chrono::Duration::from_std(expires_in).unwrap_or_default(),
            ),
        })
    }
}

/// Cover host that records uploads and serves from a fake address.
#[derive(Default)]
pub struct StubCoverHost {
    uploads: Mutex<Vec<(String, String)>>,
    destroys: Mutex<Vec<String>>,
}

impl StubCoverHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn uploaded(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroys.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoverHost for StubCoverHost {
    async fn upload(
        &self,
        key_hint: &str,
        content_type: &str,
        _data: Bytes,
    ) -> Result<CoverInfo, AppError> {
        self.uploads
            .lock()
            .unwrap()
            .push((key_hint.to_string(), content_type.to_string()));
        Ok(CoverInfo {
            id: format!("cover-{}", key_hint),
            url: format!("https://covers.test/{}", key_hint),
        })
    }

    async fn destroy(&self, cover_id: &str) -> Result<(), AppError> {
        self.destroys.lock().unwrap().push(cover_id.to_string());
        Ok(())
    }
}
