//! Multipart form parsing for book ingestion handlers.
//!
//! Extraction only: size and content-type rules live in the asset
//! coordinator, the total request body cap in the router layers.

use axum::extract::Multipart;
use bindery_core::models::{CoverUpload, PrimaryUpload};
use bindery_core::{AppError, UploadMethod};
use bytes::Bytes;

/// One file part as received: its declared MIME type and raw bytes.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub content_type: String,
    pub data: Bytes,
}

/// Raw fields of a book create or replace form.
///
/// The primary artifact arrives either as the `book` file part (local
/// method) or as the `book_content_type` + `book_size` text pair (remote
/// method). Which combinations are legal is decided by [`BookForm::primary`].
#[derive(Debug, Default)]
pub struct BookForm {
    pub title: Option<String>,
    pub upload_method: Option<UploadMethod>,
    pub book: Option<FilePart>,
    pub declared_content_type: Option<String>,
    pub declared_size: Option<u64>,
    pub cover: Option<FilePart>,
}

impl BookForm {
    /// Assemble the primary artifact submission from the form fields.
    ///
    /// Returns `None` when the form carried neither the file nor declared
    /// metadata, which the replace path accepts as "keep the current
    /// artifact".
    pub fn primary(&self) -> Result<Option<PrimaryUpload>, AppError> {
        match (&self.book, &self.declared_content_type, &self.declared_size) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(AppError::InvalidInput(
                "Send either the 'book' file or its declared metadata, not both".to_string(),
            )),
            (Some(part), None, None) => Ok(Some(PrimaryUpload::inline(
                part.content_type.clone(),
                part.data.clone(),
            ))),
            (None, Some(content_type), Some(size)) => {
                Ok(Some(PrimaryUpload::declared(content_type.clone(), *size)))
            }
            (None, Some(_), None) | (None, None, Some(_)) => Err(AppError::InvalidInput(
                "Declared uploads require both 'book_content_type' and 'book_size'".to_string(),
            )),
            (None, None, None) => Ok(None),
        }
    }

    /// The cover image submission, when the form carried one.
    pub fn cover_upload(&self) -> Option<CoverUpload> {
        self.cover.as_ref().map(|part| CoverUpload {
            content_type: part.content_type.clone(),
            data: part.data.clone(),
        })
    }
}

/// Read all recognized fields from a multipart request.
/// Duplicate fields are rejected; unknown fields are skipped.
pub async fn read_book_form(mut multipart: Multipart) -> Result<BookForm, AppError> {
    let mut form = BookForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "title" => {
                reject_duplicate(form.title.is_some(), "title")?;
                form.title = Some(read_text(field, "title").await?);
            }
            "upload_method" => {
                reject_duplicate(form.upload_method.is_some(), "upload_method")?;
                let raw = read_text(field, "upload_method").await?;
                let method = raw
                    .parse::<UploadMethod>()
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                form.upload_method = Some(method);
            }
            "book" => {
                reject_duplicate(form.book.is_some(), "book")?;
                form.book = Some(read_file(field).await?);
            }
            "book_content_type" => {
                reject_duplicate(form.declared_content_type.is_some(), "book_content_type")?;
                form.declared_content_type = Some(read_text(field, "book_content_type").await?);
            }
            "book_size" => {
                reject_duplicate(form.declared_size.is_some(), "book_size")?;
                let raw = read_text(field, "book_size").await?;
                let size = raw.trim().parse::<u64>().map_err(|_| {
                    AppError::InvalidInput(format!("Invalid book_size: {}", raw))
                })?;
                form.declared_size = Some(size);
            }
            "cover" => {
                reject_duplicate(form.cover.is_some(), "cover")?;
                form.cover = Some(read_file(field).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn reject_duplicate(already_seen: bool, name: &str) -> Result<(), AppError> {
    if already_seen {
        return Err(AppError::InvalidInput(format!(
            "Duplicate field '{}'; send each field at most once",
            name
        )));
    }
    Ok(())
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read field '{}': {}", name, e)))
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<FilePart, AppError> {
    let content_type = field
        .content_type()
        .map(|s: &str| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

    Ok(FilePart { content_type, data })
}
