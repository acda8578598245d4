use crate::browser::PageRenderer;
use crate::completion::{is_chapter_complete, record_completion};
use crate::config::{Config, ConfigError, ResumePolicy};
use crate::downloader::ImageDownloader;
use crate::error::CrawlError;
use crate::helpers::{format_chapter_number, sanitize_filename, url_slug};
use crate::models::{
    ChapterRange, ChapterReference, CrawlMode, CrawlSummary, FailedChapter, ImageJob,
    SeriesManifest,
};
use crate::parser::{parse_chapter_page, parse_series_page, SiteSelectors};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What to download in one run
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub url: String,
    pub range: Option<ChapterRange>,
}

/// Drives rendering, parsing and downloading for series and single chapters
pub struct Crawler {
    renderer: Arc<dyn PageRenderer>,
    downloader: ImageDownloader,
    selectors: SiteSelectors,
    series_marker: String,
    output_dir: PathBuf,
    resume_policy: ResumePolicy,
}

impl Crawler {
    pub fn new(config: &Config, renderer: Arc<dyn PageRenderer>) -> Result<Self, ConfigError> {
        Ok(Self {
            renderer,
            downloader: ImageDownloader::new(config.download.clone()),
            selectors: SiteSelectors::compile(&config.site)?,
            series_marker: config.site.series_path_marker.clone(),
            output_dir: PathBuf::from(&config.download_dir),
            resume_policy: config.resume.policy,
        })
    }

    pub async fn run(&self, request: &CrawlRequest) -> Result<CrawlSummary, CrawlError> {
        let summary = match CrawlMode::detect(&request.url, &self.series_marker) {
            CrawlMode::Series => self.run_series(request).await?,
            CrawlMode::SingleChapter => {
                if request.range.is_some() {
                    warn!("--from/--to only apply to series URLs, ignoring");
                }
                self.run_single_chapter(&request.url).await?
            }
        };
        log_summary(&summary);
        Ok(summary)
    }

    /// Render a page on the blocking pool
    async fn render(&self, url: &str, ready_selector: &str) -> Result<String, CrawlError> {
        let renderer = Arc::clone(&self.renderer);
        let target = url.to_string();
        let selector = ready_selector.to_string();
        tokio::task::spawn_blocking(move || renderer.render(&target, Some(selector.as_str())))
            .await?
            .map_err(|source| CrawlError::Render {
                url: url.to_string(),
                source,
            })
    }

    /// Render a series page and list its numbered chapters in ascending order
    pub async fn discover_series(&self, series_url: &str) -> Result<SeriesManifest, CrawlError> {
        let html = self
            .render(series_url, &self.selectors.chapter_link_css)
            .await?;
        Ok(parse_series_page(&html, series_url, &self.selectors))
    }

    async fn run_series(&self, request: &CrawlRequest) -> Result<CrawlSummary, CrawlError> {
        let SeriesManifest { title, chapters } = self.discover_series(&request.url).await?;
        info!("📚 Manga: {}", title);
        info!("✅ Found {} chapters", chapters.len());

        let chapters = match request.range {
            Some(range) => {
                let filtered = range.filter(chapters);
                info!("🔢 Filtered to {} chapters", filtered.len());
                filtered
            }
            None => chapters,
        };

        let title_dir = self.output_dir.join(&title);
        let mut summary = CrawlSummary::default();

        for chapter in &chapters {
            let folder = title_dir.join(chapter_folder_name(chapter));
            if is_chapter_complete(&folder, self.resume_policy).await {
                info!("⏭ Skipping {} (already downloaded)", folder.display());
                summary.skipped += 1;
                continue;
            }

            let number = chapter
                .number
                .map(format_chapter_number)
                .unwrap_or_default();
            info!("=== Downloading chapter {}: {} ===", number, chapter.url);

            let html = match self
                .render(&chapter.url, &self.selectors.chapter_image_css)
                .await
            {
                Ok(html) => html,
                Err(e) => {
                    error!("Skipping chapter {}: {}", chapter.url, e);
                    summary.failed.push(FailedChapter {
                        url: chapter.url.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let image_urls = parse_chapter_page(&html, &chapter.url, &self.selectors).image_urls;
            info!("  Found {} images", image_urls.len());
            self.download_chapter(&chapter.url, image_urls, folder, &mut summary)
                .await?;
        }

        Ok(summary)
    }

    async fn run_single_chapter(&self, chapter_url: &str) -> Result<CrawlSummary, CrawlError> {
        info!("📖 Fetching single chapter: {}", chapter_url);
        let html = self
            .render(chapter_url, &self.selectors.chapter_image_css)
            .await?;
        let page = parse_chapter_page(&html, chapter_url, &self.selectors);
        info!("✅ Found {} images", page.image_urls.len());

        let slug = url_slug(chapter_url)
            .map(|s| sanitize_filename(&s))
            .unwrap_or_else(|| "chapter".to_string());
        let folder = self.output_dir.join(&page.title).join(slug);

        let mut summary = CrawlSummary::default();
        self.download_chapter(chapter_url, page.image_urls, folder, &mut summary)
            .await?;
        Ok(summary)
    }

    async fn download_chapter(
        &self,
        chapter_url: &str,
        image_urls: Vec<String>,
        dest_dir: PathBuf,
        summary: &mut CrawlSummary,
    ) -> Result<(), CrawlError> {
        if image_urls.is_empty() {
            warn!("No images found on {}", chapter_url);
        }
        let job = ImageJob {
            image_urls,
            referer: chapter_url.to_string(),
            dest_dir,
        };
        let report = self.downloader.download(&job).await?;

        if record_completion(&job.dest_dir, chapter_url, &report).await? {
            info!(
                "Chapter complete: {} pages ({} new) in {}",
                report.expected(),
                report.saved(),
                job.dest_dir.display()
            );
            summary.downloaded += 1;
        } else {
            warn!(
                "Chapter incomplete: {}/{} pages present in {}",
                report.present(),
                report.expected(),
                job.dest_dir.display()
            );
            summary.incomplete += 1;
        }
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Folder name for a series chapter: its slug, or `chapter-<number>`
pub fn chapter_folder_name(chapter: &ChapterReference) -> String {
    chapter
        .slug()
        .map(|s| sanitize_filename(&s))
        .unwrap_or_else(|| {
            format!(
                "chapter-{}",
                chapter.number.map(format_chapter_number).unwrap_or_default()
            )
        })
}

fn log_summary(summary: &CrawlSummary) {
    info!("{}", "=".repeat(60));
    info!("📊 Downloaded: {}", summary.downloaded);
    info!("⚠️ Incomplete: {}", summary.incomplete);
    info!("⏭ Skipped: {}", summary.skipped);
    info!("❌ Failed: {}", summary.failed.len());
    for failed in &summary.failed {
        error!("  {}: {}", failed.url, failed.error);
    }
    info!("{}", "=".repeat(60));
}
