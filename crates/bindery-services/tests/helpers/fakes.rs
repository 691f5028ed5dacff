//! In-memory implementations of the repository, storage, and cover host
//! seams, with call recording and failure switches.

use async_trait::async_trait;
use bindery_core::models::{Book, CoverInfo, PrimaryUpload, UploadGrant};
use bindery_core::{AppError, UploadMethod};
use bindery_db::{BookPatch, CatalogRepository};
use bindery_services::CoverHost;
use bindery_storage::{AccessUrl, AssetStore, Placement, StorageError, StorageResult};
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
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

/// Asset store over a `HashMap`, honoring the per-method deletion contracts:
/// local deletes fail on a missing key, remote deletes do not.
pub struct MemoryStore {
    method: UploadMethod,
    objects: Mutex<HashMap<String, Bytes>>,
    deletes: Mutex<Vec<String>>,
    grants: Mutex<Vec<String>>,
    fail_delete: AtomicBool,
    fail_place: AtomicBool,
}

impl MemoryStore {
    fn new(method: UploadMethod) -> Arc<Self> {
        Arc::new(Self {
            method,
            objects: Mutex::new(HashMap::new()),
            deletes: Mutex::new(Vec::new()),
            grants: Mutex::new(Vec::new()),
            fail_delete: AtomicBool::new(false),
            fail_place: AtomicBool::new(false),
        })
    }

    pub fn local() -> Arc<Self> {
        Self::new(UploadMethod::Local)
    }

    pub fn remote() -> Arc<Self> {
        Self::new(UploadMethod::Remote)
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Drop an object behind the coordinator's back, simulating a file that
    /// went missing outside the workflow.
    pub fn remove_object(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn granted_keys(&self) -> Vec<String> {
        self.grants.lock().unwrap().clone()
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_place(&self, fail: bool) {
        self.fail_place.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    fn method(&self) -> UploadMethod {
        self.method
    }

    async fn place(
        &self,
        key: &str,
        upload: &PrimaryUpload,
        grant_ttl: Duration,
    ) -> StorageResult<Placement> {
        if self.fail_place.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed(
                "simulated write failure".to_string(),
            ));
        }

        match self.method {
            UploadMethod::Local => {
                let data = upload.data.clone().ok_or_else(|| {
                    StorageError::WriteFailed("no inline bytes in request".to_string())
                })?;
                self.objects.lock().unwrap().insert(key.to_string(), data);
                Ok(Placement::Stored)
            }
            UploadMethod::Remote => {
                self.grants.lock().unwrap().push(key.to_string());
                Ok(Placement::Granted(UploadGrant {
                    url: format!("https://grants.test/{}", key),
                    expires_at: Utc::now()
                        + chrono::Duration::from_std(grant_ttl).unwrap_or_default(),
                }))
            }
        }
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(key.to_string());

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(
                "simulated delete failure".to_string(),
            ));
        }

        let removed = self.objects.lock().unwrap().remove(key).is_some();
        match self.method {
            UploadMethod::Local if !removed => Err(StorageError::NotFound(key.to_string())),
            _ => Ok(()),
        }
    }

    async fn access_url(&self, key: &str, _expires_in: Duration) -> StorageResult<AccessUrl> {
        Ok(AccessUrl {
            url: format!("https://reads.test/{}", key),
            expires_at: match self.method {
                UploadMethod::Local => None,
                UploadMethod::Remote => Some(Utc::now() + chrono::Duration::minutes(15)),
            },
        })
    }
}

/// Cover host that records calls and can be told to fail.
#[derive(Default)]
pub struct StubCoverHost {
    uploads: Mutex<Vec<(String, String)>>,
    destroys: Mutex<Vec<String>>,
    fail_upload: AtomicBool,
    fail_destroy: AtomicBool,
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

    pub fn set_fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_destroy(&self, fail: bool) {
        self.fail_destroy.store(fail, Ordering::SeqCst);
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
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(AppError::Storage("simulated cover host outage".to_string()));
        }
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
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(AppError::Storage("simulated cover host outage".to_string()));
        }
        Ok(())
    }
}
