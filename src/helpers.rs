//! Helper functions shared by the parser, downloader and crawler
//!
//! This module provides the small pure utilities the pipeline is built on:
//! - Chapter number extraction from URL slugs
//! - Slug derivation and relative URL resolution
//! - Page filename and extension derivation
//! - Filesystem-safe folder names for titles
//!
//! # Examples
//!
//! ```
//! use rust_manga_downloader::helpers::{extract_chapter_number, page_file_name};
//!
//! assert_eq!(extract_chapter_number("chapter-12.5"), Some(12.5));
//! assert_eq!(extract_chapter_number("intro"), None);
//!
//! assert_eq!(page_file_name(1, "https://cdn.example/p/page.PNG?token=abc", ".jpg"), "001.PNG");
//! ```

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

static CHAPTER_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Extract the first integer or decimal number from a chapter slug.
///
/// Returns `None` when the slug contains no digits at all; such chapters are
/// treated as unrecognized and never take part in numeric ordering.
pub fn extract_chapter_number(slug: &str) -> Option<f64> {
    CHAPTER_NUMBER_RE
        .find(slug)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Last non-empty path segment of a URL, ignoring query and fragment.
pub fn url_slug(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => strip_query(url).to_string(),
    };
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// True when the last path segment of `url` is made only of ASCII digits.
pub fn last_segment_is_numeric(url: &str) -> bool {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Resolve a possibly-relative link against the page it was found on.
///
/// Values that cannot be resolved are returned unchanged.
pub fn resolve_url(base: Option<&Url>, href: &str) -> String {
    match base {
        Some(base) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

/// Extension (with the leading dot) of the URL's path, if it has one.
///
/// Case is preserved. Query parameters and fragments never contribute.
pub fn url_path_extension(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => strip_query(url).to_string(),
    };
    let file = path.rsplit('/').next().unwrap_or("");
    let stem_len = file.trim_start_matches('.').len();
    let file = &file[file.len() - stem_len..];
    match file.rfind('.') {
        Some(idx) if idx + 1 < file.len() => Some(file[idx..].to_string()),
        _ => None,
    }
}

/// `NNN<ext>` file name for the 1-based page `index` of a chapter.
pub fn page_file_name(index: usize, url: &str, default_extension: &str) -> String {
    let ext = url_path_extension(url).unwrap_or_else(|| default_extension.to_string());
    format!("{:03}{}", index, ext)
}

/// Replace characters that are not allowed in file names.
pub fn sanitize_filename(s: &str) -> String {
    s.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// Folder name for a manga title: trimmed, each space becomes `_`.
///
/// Falls back to `default_title` when nothing usable is left.
pub fn title_folder_name(raw: Option<&str>, default_title: &str) -> String {
    let cleaned = raw
        .map(|t| sanitize_filename(&t.trim().replace(' ', "_")))
        .unwrap_or_default();
    if cleaned.is_empty() {
        sanitize_filename(&default_title.replace(' ', "_"))
    } else {
        cleaned
    }
}

/// Human readable chapter number (`12`, `12.5`).
pub fn format_chapter_number(number: f64) -> String {
    if number.fract() == 0.0 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
