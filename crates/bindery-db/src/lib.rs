//! Bindery Database Library
//!
//! Repositories for the book catalog. All queries are dynamic SQLx queries,
//! so builds do not require a live DATABASE_URL or a prepare step.

pub mod db;

pub use db::books::{
    create_catalog_repository, BookPatch, CatalogRepository, PostgresBookRepository,
};
