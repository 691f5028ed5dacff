//! Bindery API Library
//!
//! This crate provides the HTTP handlers, auth middleware, and application
//! setup for the book catalog service.

mod api_doc;
pub mod constants;
mod handlers;
mod landlock;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use landlock::linux as landlock_linux;
pub use telemetry::init_telemetry;
