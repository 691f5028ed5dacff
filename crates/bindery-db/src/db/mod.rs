//! Database repositories for data access layer
//!
//! Each repository owns a specific table and provides the queries the
//! services layer needs, behind a trait so tests can substitute an
//! in-memory implementation.

pub mod books;

pub use books::{create_catalog_repository, BookPatch, CatalogRepository, PostgresBookRepository};
