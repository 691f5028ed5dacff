use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bindery_core::models::{BookChanges, BookUploadResponse};
use uuid::Uuid;

use crate::auth::models::AuthorContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::multipart::read_book_form;

/// Replace assets and/or metadata on an existing book.
///
/// Every field is optional: a new `title` re-derives the slug, a new `book`
/// part (or declared metadata on the remote method) replaces the primary
/// artifact, a new `cover` part replaces the cover image. The record's
/// upload method cannot be changed.
#[utoipa::path(
    patch,
    path = "/api/v0/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Book updated", body = BookUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Asset rejected", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(author_id = %author.author_id, book_id = %id, operation = "update_book")
)]
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    author: AuthorContext,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<BookUploadResponse>, HttpAppError> {
    let form = read_book_form(multipart).await?;

    let changes = BookChanges {
        title: form.title.clone(),
    };
    let primary = form.primary()?;
    let cover = form.cover_upload();

    let outcome = state
        .assets
        .service
        .replace_asset(
            author.author_id,
            id,
            form.upload_method,
            changes,
            primary,
            cover,
        )
        .await?;

    Ok(Json(BookUploadResponse::new(
        outcome.book,
        outcome.upload_grant,
    )))
}
