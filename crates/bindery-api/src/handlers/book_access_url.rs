use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bindery_core::models::AccessUrlResponse;
use uuid::Uuid;

use crate::auth::models::AuthorContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// A URL through which the owner can fetch the book's primary artifact.
///
/// Remote records get a time-limited signed GET URL; local records get a
/// stable public URL with no expiry.
#[utoipa::path(
    get,
    path = "/api/v0/books/{id}/access-url",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Access URL", body = AccessUrlResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(author_id = %author.author_id, book_id = %id))]
pub async fn get_access_url(
    author: AuthorContext,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccessUrlResponse>, HttpAppError> {
    let access = state
        .assets
        .service
        .access_url(author.author_id, id)
        .await?;

    Ok(Json(AccessUrlResponse {
        url: access.url,
        expires_at: access.expires_at,
    }))
}
