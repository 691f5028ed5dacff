use bindery_core::models::{Book, CoverInfo, FileInfo};
use bindery_core::AppError;
use sqlx::{PgPool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

/// Trait for catalog repository operations
/// This abstracts the database implementation (PostgreSQL)
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a fully-constructed record and return it as persisted.
    async fn insert(&self, book: &Book) -> Result<Book, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, AppError>;

    /// Apply a partial update and return the resulting row.
    ///
    /// Returns `AppError::NotFound` when no row matches. Rows carry no
    /// version column; concurrent updates resolve last-write-wins.
    async fn update(&self, id: Uuid, patch: BookPatch) -> Result<Book, AppError>;
}

/// Partial update applied after artifact placement or a metadata edit.
///
/// `None` leaves the column untouched. Cover columns are only ever set,
/// never cleared, so a replace whose cover step failed keeps the previous
/// cover on the record.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub file_info: Option<FileInfo>,
    pub cover: Option<CoverInfo>,
}

impl BookPatch {
    /// True when the patch would touch no column.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.file_info.is_none()
            && self.cover.is_none()
    }
}

#[derive(Clone)]
pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for PostgresBookRepository {
    #[tracing::instrument(skip(self, book), fields(
        db.system = "postgresql",
        db.table = "books",
        db.operation = "insert",
        book.id = %book.id
    ))]
    async fn insert(&self, book: &Book) -> Result<Book, AppError> {
        let created = sqlx::query_as::<Postgres, Book>(
            r#"
            INSERT INTO books (
                id, author_id, title, slug, upload_method,
                file_key, file_size, cover_id, cover_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(book.author_id)
        .bind(&book.title)
        .bind(&book.slug)
        .bind(book.upload_method)
        .bind(&book.file_info.id)
        .bind(&book.file_info.size)
        .bind(book.cover.as_ref().map(|c| c.id.clone()))
        .bind(book.cover.as_ref().map(|c| c.url.clone()))
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, book_id = %book.id, "Failed to insert book");
            AppError::from(e)
        })?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "books",
        db.operation = "select_one"
    ))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, AppError> {
        let book = sqlx::query_as::<Postgres, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    #[tracing::instrument(skip(self, patch), fields(
        db.system = "postgresql",
        db.table = "books",
        db.operation = "update"
    ))]
    async fn update(&self, id: Uuid, patch: BookPatch) -> Result<Book, AppError> {
        let (file_key, file_size) = match patch.file_info {
            Some(info) => (Some(info.id), Some(info.size)),
            None => (None, None),
        };
        let (cover_id, cover_url) = match patch.cover {
            Some(cover) => (Some(cover.id), Some(cover.url)),
            None => (None, None),
        };

        let updated = sqlx::query_as::<Postgres, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                file_key = COALESCE($4, file_key),
                file_size = COALESCE($5, file_size),
                cover_id = COALESCE($6, cover_id),
                cover_url = COALESCE($7, cover_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.slug)
        .bind(file_key)
        .bind(file_size)
        .bind(cover_id)
        .bind(cover_url)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }
}

/// Factory function for the catalog repository backed by PostgreSQL
pub fn create_catalog_repository(pool: PgPool) -> Arc<dyn CatalogRepository> {
    Arc::new(PostgresBookRepository::new(pool))
}
