//! Download and archive entry names

use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Characters outside `[A-Za-z0-9]` (compiled once)
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("filename regex is valid"));

/// Maximum length of the title part of an archive entry name
pub const TITLE_PREFIX_LEN: usize = 20;

/// Replace every non-alphanumeric character with `_` and keep the first 20.
///
/// Counting is in UTF-16 code units, so a character outside the Basic
/// Multilingual Plane (most emoji) becomes `__`. Names stay identical to
/// the ones the browser build produced for the same title.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(title, |caps: &Captures| {
            let units: usize = caps[0].chars().map(char::len_utf16).sum();
            "_".repeat(units)
        })
        .chars()
        .take(TITLE_PREFIX_LEN)
        .collect()
}

/// Entry name inside the image archive: `<sanitized title>_<id>.png`
pub fn entry_filename(title: &str, id: &str) -> String {
    format!("{}_{}.png", sanitize_title(title), id)
}

/// Name offered for the archive download: `<namespace>_<YYYY-MM-DD>.zip`
pub fn archive_filename(namespace: &str, date: NaiveDate) -> String {
    format!("{}_{}.zip", namespace, date.format("%Y-%m-%d"))
}

/// Name offered for a single image download: `<namespace>-<id>.png`
pub fn image_filename(namespace: &str, id: &str) -> String {
    format!("{}-{}.png", namespace, id)
}
