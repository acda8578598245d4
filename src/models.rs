use crate::helpers::{extract_chapter_number, last_segment_is_numeric, url_slug};
use std::path::PathBuf;

/// A chapter link found on a series page.
///
/// The URL is the identity; the number is derived from its slug and is
/// `None` when the slug carries no number.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterReference {
    pub number: Option<f64>,
    pub url: String,
}

impl ChapterReference {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let number = url_slug(&url).and_then(|slug| extract_chapter_number(&slug));
        Self { number, url }
    }

    pub fn slug(&self) -> Option<String> {
        url_slug(&self.url)
    }
}

/// Title and ascending chapter list of one series.
#[derive(Debug, Clone)]
pub struct SeriesManifest {
    pub title: String,
    pub chapters: Vec<ChapterReference>,
}

/// Everything needed to download one chapter's pages.
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub image_urls: Vec<String>,
    pub referer: String,
    pub dest_dir: PathBuf,
}

/// Outcome of a single page download.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadResult {
    Saved { path: PathBuf, bytes: usize },
    SkippedExisting { path: PathBuf },
    FailedHttp { status: u16 },
    FailedTransport { cause: String },
    FailedWrite { cause: String },
}

impl DownloadResult {
    /// The page is on disk after this attempt.
    pub fn is_present(&self) -> bool {
        matches!(
            self,
            DownloadResult::Saved { .. } | DownloadResult::SkippedExisting { .. }
        )
    }
}

/// Per-page results of one chapter download, in on-page order.
#[derive(Debug, Clone, Default)]
pub struct ChapterReport {
    pub results: Vec<DownloadResult>,
}

impl ChapterReport {
    pub fn expected(&self) -> usize {
        self.results.len()
    }

    pub fn present(&self) -> usize {
        self.results.iter().filter(|r| r.is_present()).count()
    }

    pub fn saved(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, DownloadResult::Saved { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.expected() - self.present()
    }

    /// Every page is on disk and there was at least one page.
    pub fn is_complete(&self) -> bool {
        !self.results.is_empty() && self.failed() == 0
    }
}

/// How a run treats its input URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    Series,
    SingleChapter,
}

impl CrawlMode {
    /// Series mode when the URL contains `series_marker` and does not end in
    /// a purely numeric segment; single-chapter mode otherwise.
    pub fn detect(url: &str, series_marker: &str) -> Self {
        if url.contains(series_marker) && !last_segment_is_numeric(url) {
            CrawlMode::Series
        } else {
            CrawlMode::SingleChapter
        }
    }
}

/// Inclusive chapter-number bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterRange {
    pub from: f64,
    pub to: f64,
}

impl ChapterRange {
    /// A range only exists when both bounds were given.
    pub fn from_bounds(from: Option<f64>, to: Option<f64>) -> Option<Self> {
        match (from, to) {
            (Some(from), Some(to)) => Some(Self { from, to }),
            _ => None,
        }
    }

    pub fn contains(&self, number: f64) -> bool {
        self.from <= number && number <= self.to
    }

    pub fn filter(&self, chapters: Vec<ChapterReference>) -> Vec<ChapterReference> {
        chapters
            .into_iter()
            .filter(|c| c.number.map(|n| self.contains(n)).unwrap_or(false))
            .collect()
    }
}

/// Totals for one run.
#[derive(Debug, Default, Clone)]
pub struct CrawlSummary {
    pub downloaded: usize,
    pub incomplete: usize,
    pub skipped: usize,
    pub failed: Vec<FailedChapter>,
}

#[derive(Debug, Clone)]
pub struct FailedChapter {
    pub url: String,
    pub error: String,
}

impl CrawlSummary {
    /// Chapters whose pages were fetched in this run.
    pub fn attempted(&self) -> usize {
        self.downloaded + self.incomplete
    }
}
