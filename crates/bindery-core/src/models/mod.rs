//! Data models for the application
//!
//! This module contains the catalog record and the ephemeral ingestion types
//! that travel between the HTTP layer and the asset coordinator.

mod book;
mod ingest;

// Re-export all models for convenient imports
pub use book::*;
pub use ingest::*;
