//! OpenAPI documentation.
//! API version is in `crate::constants::API_VERSION`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use bindery_core::models;

/// The OpenAPI spec served at /api/openapi.json.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bindery API",
        version = "0.1.0",
        description = "E-book catalog ingestion API (v0). Accepts EPUB uploads with optional cover images, persisted on the local filesystem or in a remote bucket via presigned URLs. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::book_upload::upload_book,
        handlers::book_update::update_book,
        handlers::book_get::get_book,
        handlers::book_access_url::get_access_url,
        handlers::book_download::download_book,
    ),
    components(
        schemas(
            models::Book,
            models::FileInfo,
            models::CoverInfo,
            models::BookUploadResponse,
            models::AccessUrlResponse,
            models::UploadGrant,
            bindery_core::UploadMethod,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "books", description = "Book upload, replacement, and delivery operations")
    )
)]
pub struct ApiDoc;
