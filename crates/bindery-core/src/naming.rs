//! Derived names for catalog records and their stored assets
//!
//! Storage keys, record slugs, and the human-readable size string persisted in
//! `file_info.size` are all derived here. Everything in this module is pure:
//! no I/O, deterministic for the same inputs.

use crate::error::AppError;

/// Decimal units for [`format_byte_size`].
const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Derive the storage key for a primary artifact.
///
/// The key is `{record_id}-{title}` slugified (lowercase, hyphen-separated,
/// URL- and filesystem-safe) with the extension appended. The record id prefix
/// makes keys unique across records regardless of title; the title part is
/// cosmetic. Deterministic: the same inputs always produce the same key.
///
/// The only failure mode is an empty `record_id`.
///
/// ```
/// # use bindery_core::naming::asset_key;
/// let key = asset_key("abc123", "Dune", "epub").unwrap();
/// assert_eq!(key, "abc123-dune.epub");
/// ```
pub fn asset_key(record_id: &str, title: &str, extension: &str) -> Result<String, AppError> {
    if record_id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "record id must not be empty".to_string(),
        ));
    }

    let base = slugify(&format!("{} {}", record_id, title));
    let ext = extension.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        Ok(base)
    } else {
        Ok(format!("{}.{}", base, ext))
    }
}

/// Derive the record's URL slug: title first, record id suffixed so two books
/// with the same title stay distinguishable.
pub fn record_slug(title: &str, record_id: &str) -> String {
    slugify(&format!("{} {}", title, record_id))
}

/// Lowercase, replace whitespace runs with single hyphens, keep only
/// characters that are safe in both URLs and file names. Non-ASCII characters
/// are dropped rather than transliterated.
fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.trim().chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
        // every other character is dropped
    }

    out
}

/// Format a byte count for `file_info.size` using decimal units.
///
/// Integral values render without a fraction (`500000` -> `"500 KB"`),
/// everything else with two decimals (`1536` -> `"1.54 KB"`).
pub fn format_byte_size(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    if value.fract() == 0.0 {
        format!("{:.0} {}", value, SIZE_UNITS[unit])
    } else {
        format!("{:.2} {}", value, SIZE_UNITS[unit])
    }
}
