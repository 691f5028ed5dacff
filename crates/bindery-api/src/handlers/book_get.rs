use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bindery_core::models::Book;
use bindery_core::AppError;
use uuid::Uuid;

use crate::auth::models::AuthorContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Fetch a book record.
#[utoipa::path(
    get,
    path = "/api/v0/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book record", body = Book),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_book(
    author: AuthorContext,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Book>, HttpAppError> {
    let book = state.assets.service.fetch_book(id).await?;

    // Foreign ids answer exactly like missing ones.
    if book.author_id != author.author_id {
        return Err(AppError::NotFound(format!("Book {} not found", id)).into());
    }

    Ok(Json(book))
}
