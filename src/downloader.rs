use crate::config::DownloadSettings;
use crate::error::CrawlError;
use crate::helpers::page_file_name;
use crate::models::{ChapterReport, DownloadResult, ImageJob};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Downloads the pages of one chapter with per-file resume.
///
/// Each call builds its own HTTP client carrying the chapter URL as
/// `Referer`; the client is dropped when the call returns.
pub struct ImageDownloader {
    settings: DownloadSettings,
}

impl ImageDownloader {
    pub fn new(settings: DownloadSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, referer: &str) -> Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("image/avif,image/webp,image/apng,image/*,*/*;q=0.8"),
        );
        match HeaderValue::from_str(referer) {
            Ok(value) => {
                headers.insert(REFERER, value);
            }
            Err(_) => log::warn!("Referer {} is not a valid header value, sending none", referer),
        }

        ClientBuilder::new()
            .timeout(self.settings.timeout())
            .user_agent(self.settings.user_agent.as_str())
            .default_headers(headers)
            .build()
    }

    /// Download every image of `job` into its destination folder.
    ///
    /// Only failing to create the folder or the client is an error; every
    /// per-image failure is logged and recorded in the report.
    pub async fn download(&self, job: &ImageJob) -> Result<ChapterReport, CrawlError> {
        tokio::fs::create_dir_all(&job.dest_dir)
            .await
            .map_err(|source| CrawlError::CreateDir {
                path: job.dest_dir.clone(),
                source,
            })?;

        let client = self.build_client(&job.referer)?;
        let total = job.image_urls.len();
        let concurrency = self.settings.concurrency.max(1);

        let results = stream::iter(job.image_urls.iter().enumerate())
            .map(|(i, url)| self.fetch_one(&client, i + 1, total, url, &job.dest_dir))
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(ChapterReport { results })
    }

    async fn fetch_one(
        &self,
        client: &Client,
        index: usize,
        total: usize,
        url: &str,
        dest_dir: &Path,
    ) -> DownloadResult {
        let path = dest_dir.join(page_file_name(index, url, &self.settings.default_extension));

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            log::info!("[{}/{}] Skipping (already exists) {}", index, total, path.display());
            return DownloadResult::SkippedExisting { path };
        }

        log::info!("[{}/{}] Downloading {}", index, total, url);
        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("[{}/{}] Error fetching {}: {}", index, total, url, e);
                return DownloadResult::FailedTransport { cause: e.to_string() };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("[{}/{}] Failed HTTP {} for {}", index, total, status.as_u16(), url);
            return DownloadResult::FailedHttp {
                status: status.as_u16(),
            };
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                log::error!("[{}/{}] Error reading body of {}: {}", index, total, url, e);
                return DownloadResult::FailedTransport { cause: e.to_string() };
            }
        };

        match write_atomic(&path, &body).await {
            Ok(()) => DownloadResult::Saved {
                path,
                bytes: body.len(),
            },
            Err(e) => {
                log::error!("[{}/{}] Error writing {}: {}", index, total, path.display(), e);
                DownloadResult::FailedWrite { cause: e.to_string() }
            }
        }
    }
}

/// `<path>.part` sibling used while a page is being written
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Write to a `.part` file and rename, so a page only appears once complete
async fn write_atomic(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let part = partial_path(path);
    if let Err(e) = tokio::fs::write(&part, body).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&part, path).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let downloader = ImageDownloader::new(DownloadSettings::default());
        assert!(downloader
            .build_client("https://site.example/series/foo/chapter-1/")
            .is_ok());
    }

    #[test]
    fn test_client_creation_with_odd_referer() {
        let downloader = ImageDownloader::new(DownloadSettings::default());
        assert!(downloader.build_client("https://site.example/\nchapter").is_ok());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("out/001.jpg")),
            PathBuf::from("out/001.jpg.part")
        );
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("001.jpg");
        write_atomic(&path, b"page").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"page");
        assert!(!partial_path(&path).exists());
    }
}
