//! Bindery Storage Library
//!
//! This crate provides the asset storage abstraction and its two backends:
//! the local filesystem and S3-compatible object stores.
//!
//! # Backend selection
//!
//! Every book record carries an upload method, and every request that touches
//! storage resolves its backend exactly once through [`AssetBackends::select`].
//! All subsequent steps of that request (delete the old artifact, place the
//! new one, sign a read URL) go through the handle that selection returned,
//! so a single request never mixes backends.
//!
//! # Deletion contracts
//!
//! The two backends deliberately differ on deletes. [`LocalAssetStore`] is
//! strict: deleting a missing file is a [`StorageError::NotFound`], because
//! callers check existence first and an absent file means the record and the
//! disk have diverged. [`RemoteAssetStore`] is lenient: a missing object is
//! treated as already deleted, since the replaced object may never have been
//! uploaded in the first place.

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_local_store, create_remote_store, AssetBackends};
pub use local::LocalAssetStore;
pub use s3::RemoteAssetStore;
pub use traits::{AccessUrl, AssetStore, Placement, StorageError, StorageResult};
