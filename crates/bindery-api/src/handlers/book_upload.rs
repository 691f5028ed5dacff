use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bindery_core::models::{BookDraft, BookUploadResponse};
use bindery_core::AppError;

use crate::auth::models::AuthorContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::multipart::read_book_form;

/// Create a book record from one multipart request.
///
/// On the local method the `book` part carries the e-book bytes and they are
/// written before the record is persisted. On the remote method the client
/// declares `book_content_type` + `book_size` instead and receives a
/// presigned `upload_url` to PUT the bytes through. An optional `cover` part
/// is hosted on both methods; a cover failure never fails the request.
#[utoipa::path(
    post,
    path = "/api/v0/books",
    tag = "books",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Book created", body = BookUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Asset rejected", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(author_id = %author.author_id, operation = "upload_book")
)]
pub async fn upload_book(
    State(state): State<Arc<AppState>>,
    author: AuthorContext,
    multipart: Multipart,
) -> Result<(StatusCode, Json<BookUploadResponse>), HttpAppError> {
    let form = read_book_form(multipart).await?;

    let title = form
        .title
        .clone()
        .ok_or_else(|| AppError::InvalidInput("Missing required field 'title'".to_string()))?;
    let method = form.upload_method.ok_or_else(|| {
        AppError::InvalidInput("Missing required field 'upload_method'".to_string())
    })?;
    let primary = form.primary()?.ok_or_else(|| {
        AppError::InvalidInput(
            "Missing the book file: send the 'book' part or its declared metadata".to_string(),
        )
    })?;
    let cover = form.cover_upload();

    let outcome = state
        .assets
        .service
        .create_asset(author.author_id, method, BookDraft { title }, primary, cover)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookUploadResponse::new(outcome.book, outcome.upload_grant)),
    ))
}
