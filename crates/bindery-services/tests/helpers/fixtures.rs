//! Test fixtures: uploads and drafts.

use bindery_core::models::{BookDraft, CoverUpload, PrimaryUpload};
use bytes::Bytes;

pub const EPUB_CONTENT_TYPE: &str = "application/epub+zip";

pub fn draft(title: &str) -> BookDraft {
    BookDraft {
        title: title.to_string(),
    }
}

/// Inline upload carrying `len` bytes, as the local method submits them.
pub fn epub_inline(len: usize) -> PrimaryUpload {
    PrimaryUpload::inline(EPUB_CONTENT_TYPE, Bytes::from(vec![0x50; len]))
}

/// Metadata-only upload, as the remote method submits it.
pub fn epub_declared(size: u64) -> PrimaryUpload {
    PrimaryUpload::declared(EPUB_CONTENT_TYPE, size)
}

pub fn png_cover() -> CoverUpload {
    CoverUpload {
        content_type: "image/png".to_string(),
        data: Bytes::from_static(&[0x89, 0x50, 0x4E, 0x47]),
    }
}

pub fn pdf_cover() -> CoverUpload {
    CoverUpload {
        content_type: "application/pdf".to_string(),
        data: Bytes::from_static(b"%PDF-1.4"),
    }
}
