//! Test helpers: in-memory catalog/storage fakes and a service harness.
//!
//! Run from workspace root: `cargo test -p bindery-services --test ingest_test`.

pub mod fakes;
pub mod fixtures;

use bindery_db::CatalogRepository;
use bindery_services::{AssetBackends, AssetStore, BookAssetService, CoverHost, IngestSettings};
use fakes::{MemoryCatalog, MemoryStore, StubCoverHost};
use std::sync::Arc;
use std::time::Duration;

/// Service wired to in-memory fakes, with handles kept for assertions.
pub struct TestHarness {
    pub service: BookAssetService,
    pub catalog: Arc<MemoryCatalog>,
    pub local: Arc<MemoryStore>,
    pub remote: Arc<MemoryStore>,
    pub cdn_covers: Arc<StubCoverHost>,
    pub bucket_covers: Arc<StubCoverHost>,
}

pub fn test_settings() -> IngestSettings {
    IngestSettings {
        grant_ttl: Duration::from_secs(900),
        read_ttl: Duration::from_secs(900),
        book_content_type: "application/epub+zip".to_string(),
        max_book_size_bytes: 10 * 1024 * 1024,
        max_cover_size_bytes: 1024 * 1024,
    }
}

/// Harness with both backends configured.
pub fn harness() -> TestHarness {
    let catalog = MemoryCatalog::new();
    let local = MemoryStore::local();
    let remote = MemoryStore::remote();
    let cdn_covers = StubCoverHost::new();
    let bucket_covers = StubCoverHost::new();

    let backends = AssetBackends::new(
        Some(local.clone() as Arc<dyn AssetStore>),
        Some(remote.clone() as Arc<dyn AssetStore>),
    )
    .expect("at least one backend configured");

    let service = BookAssetService::new(
        catalog.clone() as Arc<dyn CatalogRepository>,
        backends,
        cdn_covers.clone() as Arc<dyn CoverHost>,
        Some(bucket_covers.clone() as Arc<dyn CoverHost>),
        test_settings(),
    );

    TestHarness {
        service,
        catalog,
        local,
        remote,
        cdn_covers,
        bucket_covers,
    }
}

/// Harness with only the local backend configured.
pub fn local_only_harness() -> TestHarness {
    let catalog = MemoryCatalog::new();
    let local = MemoryStore::local();
    let remote = MemoryStore::remote();
    let cdn_covers = StubCoverHost::new();
    let bucket_covers = StubCoverHost::new();

    let backends = AssetBackends::new(Some(local.clone() as Arc<dyn AssetStore>), None)
        .expect("at least one backend configured");

    let service = BookAssetService::new(
        catalog.clone() as Arc<dyn CatalogRepository>,
        backends,
        cdn_covers.clone() as Arc<dyn CoverHost>,
        Some(bucket_covers.clone() as Arc<dyn CoverHost>),
        test_settings(),
    );

    TestHarness {
        service,
        catalog,
        local,
        remote,
        cdn_covers,
        bucket_covers,
    }
}

/// Harness where remote storage exists but no public bucket host was wired.
pub fn harness_without_bucket_covers() -> TestHarness {
    let catalog = MemoryCatalog::new();
    let local = MemoryStore::local();
    let remote = MemoryStore::remote();
    let cdn_covers = StubCoverHost::new();
    let bucket_covers = StubCoverHost::new();

    let backends = AssetBackends::new(
        Some(local.clone() as Arc<dyn AssetStore>),
        Some(remote.clone() as Arc<dyn AssetStore>),
    )
    .expect("at least one backend configured");

    let service = BookAssetService::new(
        catalog.clone() as Arc<dyn CatalogRepository>,
        backends,
        cdn_covers.clone() as Arc<dyn CoverHost>,
        None,
        test_settings(),
    );

    TestHarness {
        service,
        catalog,
        local,
        remote,
        cdn_covers,
        bucket_covers,
    }
}
