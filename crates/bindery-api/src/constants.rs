//! API constants.

/// Current API version segment.
pub const API_VERSION: &str = "v0";

/// Versioned prefix for all book routes, e.g. `/api/v0/books`.
pub const API_PREFIX: &str = "/api/v0";
