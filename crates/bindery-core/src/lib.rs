//! Bindery Core Library
//!
//! This crate provides core domain models, error types, configuration, and the
//! pure naming/formatting helpers shared across all Bindery components.

pub mod config;
pub mod error;
pub mod models;
pub mod naming;
pub mod upload_method;

// Re-export commonly used types
pub use config::{BaseConfig, CatalogConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use upload_method::UploadMethod;
