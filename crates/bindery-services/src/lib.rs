//! Bindery Services Layer
//!
//! This crate is the **business service layer**: it hosts the book asset
//! coordinator (create/replace/read workflows) and the cover hosting services,
//! and re-exports a unified API from the storage and repository crates so that
//! the API crate depends on a single service facade. Keep business logic and
//! coordination here; keep thin HTTP handling in bindery-api.

pub mod services;

pub use bindery_db::{create_catalog_repository, BookPatch, CatalogRepository};
pub use bindery_storage::{
    create_local_store, create_remote_store, AccessUrl, AssetBackends, AssetStore,
    LocalAssetStore, Placement, RemoteAssetStore, StorageError, StorageResult,
};
pub use services::covers::{
    create_bucket_cover_host, create_cdn_cover_host, BucketCovers, CloudinaryCovers, CoverHost,
    DisabledCovers,
};
pub use services::ingest::{
    ArtifactDelivery, BookAssetService, IngestSettings, BOOK_EXTENSION, COVER_EXTENSION,
};
