//! Test fixtures: raw multipart payloads.

#![allow(dead_code)]

pub const EPUB_CONTENT_TYPE: &str = "application/epub+zip";

/// Book payload of `len` bytes for inline uploads.
pub fn epub_bytes(len: usize) -> Vec<u8> {
    vec![0x50; len]
}

/// Minimal PNG signature, enough to pass the image content-type gate.
pub fn png_bytes() -> Vec<u8> {
    vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
}
