use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use bindery_core::AppError;
use bindery_services::ArtifactDelivery;
use uuid::Uuid;

use crate::auth::models::AuthorContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Serve the book's primary artifact.
///
/// Local records are read from disk and served as an attachment; remote
/// records answer with a 307 redirect to a signed GET URL so the bytes
/// never pass through the API.
#[utoipa::path(
    get,
    path = "/api/v0/books/{id}/file",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book file", content_type = "application/epub+zip"),
        (status = 307, description = "Redirect to a signed download URL"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(author_id = %author.author_id, book_id = %id))]
pub async fn download_book(
    author: AuthorContext,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let delivery = state
        .assets
        .service
        .deliver_artifact(author.author_id, id)
        .await?;

    match delivery {
        ArtifactDelivery::Bytes { book, data } => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, state.assets.book_content_type.clone())
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", book.file_info.id),
                )
                .header(header::CACHE_CONTROL, "private")
                .body(Body::from(data))
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to build response");
                    HttpAppError::from(AppError::Internal(e.to_string()))
                })?;

            Ok(response)
        }
        ArtifactDelivery::Redirect { url } => Ok(Redirect::temporary(&url).into_response()),
    }
}
