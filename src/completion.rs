//! Chapter completion tracking.
//!
//! A chapter folder is complete when it holds a marker file written after
//! every page was saved. The legacy rule (any non-empty folder) is still
//! available through [`ResumePolicy::NonEmpty`].

use crate::config::ResumePolicy;
use crate::error::CrawlError;
use crate::models::ChapterReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MARKER_FILE_NAME: &str = ".chapter-complete.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompletionMarker {
    pub chapter_url: String,
    pub expected_images: usize,
    pub saved_images: usize,
    pub completed_at: DateTime<Utc>,
}

impl CompletionMarker {
    pub fn is_complete(&self) -> bool {
        self.expected_images > 0 && self.saved_images == self.expected_images
    }
}

pub fn marker_path(chapter_dir: &Path) -> PathBuf {
    chapter_dir.join(MARKER_FILE_NAME)
}

/// Read the marker of `chapter_dir`, if there is a readable one.
pub async fn read_marker(chapter_dir: &Path) -> Option<CompletionMarker> {
    let path = marker_path(chapter_dir);
    let content = tokio::fs::read_to_string(&path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(marker) => Some(marker),
        Err(e) => {
            log::warn!("Ignoring unreadable marker {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the marker when every page of the chapter is on disk.
///
/// Returns whether a marker was written.
pub async fn record_completion(
    chapter_dir: &Path,
    chapter_url: &str,
    report: &ChapterReport,
) -> Result<bool, CrawlError> {
    if !report.is_complete() {
        return Ok(false);
    }
    let marker = CompletionMarker {
        chapter_url: chapter_url.to_string(),
        expected_images: report.expected(),
        saved_images: report.present(),
        completed_at: Utc::now(),
    };
    let path = marker_path(chapter_dir);
    let json = serde_json::to_string_pretty(&marker)
        .map_err(|e| CrawlError::Marker {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|source| CrawlError::Marker { path, source })?;
    Ok(true)
}

async fn dir_is_non_empty(dir: &Path) -> bool {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(Some(_))),
        Err(_) => false,
    }
}

/// Whether the chapter in `chapter_dir` needs no further downloading.
pub async fn is_chapter_complete(chapter_dir: &Path, policy: ResumePolicy) -> bool {
    match policy {
        ResumePolicy::Marker => read_marker(chapter_dir)
            .await
            .map(|m| m.is_complete())
            .unwrap_or(false),
        ResumePolicy::NonEmpty => dir_is_non_empty(chapter_dir).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DownloadResult;

    fn report(results: Vec<DownloadResult>) -> ChapterReport {
        ChapterReport { results }
    }

    fn saved(name: &str) -> DownloadResult {
        DownloadResult::Saved {
            path: PathBuf::from(name),
            bytes: 1,
        }
    }

    #[tokio::test]
    async fn test_marker_written_only_when_complete() {
        let dir = tempfile::tempdir().unwrap();

        let partial = report(vec![saved("001.jpg"), DownloadResult::FailedHttp { status: 403 }]);
        assert!(!record_completion(dir.path(), "https://c/1", &partial).await.unwrap());
        assert!(!marker_path(dir.path()).exists());

        let full = report(vec![
            saved("001.jpg"),
            DownloadResult::SkippedExisting {
                path: PathBuf::from("002.jpg"),
            },
        ]);
        assert!(record_completion(dir.path(), "https://c/1", &full).await.unwrap());

        let marker = read_marker(dir.path()).await.unwrap();
        assert_eq!(marker.chapter_url, "https://c/1");
        assert_eq!(marker.expected_images, 2);
        assert_eq!(marker.saved_images, 2);
    }

    #[tokio::test]
    async fn test_empty_chapter_never_complete() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!record_completion(dir.path(), "https://c/1", &report(vec![])).await.unwrap());
        assert!(!is_chapter_complete(dir.path(), ResumePolicy::Marker).await);
    }

    #[tokio::test]
    async fn test_marker_policy_ignores_partial_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("001.jpg"), b"x").unwrap();

        assert!(!is_chapter_complete(dir.path(), ResumePolicy::Marker).await);
        assert!(is_chapter_complete(dir.path(), ResumePolicy::NonEmpty).await);
    }

    #[tokio::test]
    async fn test_missing_folder_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(!is_chapter_complete(&missing, ResumePolicy::Marker).await);
        assert!(!is_chapter_complete(&missing, ResumePolicy::NonEmpty).await);
    }

    #[tokio::test]
    async fn test_corrupt_marker_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(marker_path(dir.path()), "{not json").unwrap();
        assert!(!is_chapter_complete(dir.path(), ResumePolicy::Marker).await);
    }
}
