use crate::browser::BrowserError;
use std::path::PathBuf;

/// Errors that end a chapter or a whole run.
///
/// Per-image failures never surface here; they are reported as
/// [`DownloadResult`](crate::models::DownloadResult) values instead.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Failed to render {url}: {source}")]
    Render {
        url: String,
        #[source]
        source: BrowserError,
    },

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write completion marker {}: {source}", .path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Background render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
