//! HTML parsing for WP-Manga (Madara) series and chapter pages

use crate::config::{ConfigError, SiteSettings};
use crate::helpers::{resolve_url, title_folder_name};
use crate::models::{ChapterReference, SeriesManifest};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Compiled selectors and attribute rules for one site layout
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    pub title: Selector,
    pub chapter_link: Selector,
    pub chapter_image: Selector,
    pub lazy_attributes: Vec<String>,
    pub default_title: String,
    /// Raw selector strings, used as browser readiness checks
    pub chapter_link_css: String,
    pub chapter_image_css: String,
}

impl SiteSelectors {
    pub fn compile(site: &SiteSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            title: parse_selector(&site.title_selector)?,
            chapter_link: parse_selector(&site.chapter_link_selector)?,
            chapter_image: parse_selector(&site.chapter_image_selector)?,
            lazy_attributes: site.lazy_attributes.clone(),
            default_title: site.default_title.clone(),
            chapter_link_css: site.chapter_link_selector.clone(),
            chapter_image_css: site.chapter_image_selector.clone(),
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Folder-safe title from the page's primary heading
pub fn extract_title(document: &Html, selectors: &SiteSelectors) -> String {
    let heading = document
        .select(&selectors.title)
        .next()
        .map(|h| h.text().collect::<String>());
    if heading.is_none() {
        log::debug!("No title heading found, using {}", selectors.default_title);
    }
    title_folder_name(heading.as_deref(), &selectors.default_title)
}

/// Image URL of one reader element: lazy attributes first, then `src`
fn image_source(element: &ElementRef, lazy_attributes: &[String]) -> Option<String> {
    lazy_attributes
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .or_else(|| element.value().attr("src").map(str::trim))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Image URLs of a rendered chapter page, in reading order.
///
/// An empty list means the page had no reader images; that is not an error.
pub fn extract_chapter_images(html: &str, selectors: &SiteSelectors) -> Vec<String> {
    let document = Html::parse_document(html);
    chapter_images_in(&document, selectors)
}

fn chapter_images_in(document: &Html, selectors: &SiteSelectors) -> Vec<String> {
    document
        .select(&selectors.chapter_image)
        .filter_map(|img| image_source(&img, &selectors.lazy_attributes))
        .collect()
}

/// Parsed chapter page: folder title plus absolute image URLs
#[derive(Debug, Clone)]
pub struct ChapterPage {
    pub title: String,
    pub image_urls: Vec<String>,
}

/// Parse a rendered chapter page, resolving image URLs against `chapter_url`
pub fn parse_chapter_page(html: &str, chapter_url: &str, selectors: &SiteSelectors) -> ChapterPage {
    let document = Html::parse_document(html);
    let base = Url::parse(chapter_url).ok();
    ChapterPage {
        title: extract_title(&document, selectors),
        image_urls: chapter_images_in(&document, selectors)
            .iter()
            .map(|src| resolve_url(base.as_ref(), src))
            .collect(),
    }
}

/// Parse a rendered series page into its title and ascending chapter list.
///
/// Anchors are listed newest-first on the page; they are reversed to
/// oldest-first, deduplicated by URL, stripped of chapters without a number
/// and then stably sorted by number.
pub fn parse_series_page(html: &str, series_url: &str, selectors: &SiteSelectors) -> SeriesManifest {
    let document = Html::parse_document(html);
    let title = extract_title(&document, selectors);
    let base = Url::parse(series_url).ok();

    let mut hrefs: Vec<String> = document
        .select(&selectors.chapter_link)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(|h| resolve_url(base.as_ref(), h))
        .collect();
    hrefs.reverse();

    let found = hrefs.len();
    let mut seen: HashSet<String> = HashSet::new();
    let mut chapters: Vec<ChapterReference> = hrefs
        .into_iter()
        .filter(|h| seen.insert(h.clone()))
        .map(ChapterReference::from_url)
        .filter(|c| {
            if c.number.is_none() {
                log::debug!("Ignoring chapter without a number: {}", c.url);
            }
            c.number.is_some()
        })
        .collect();

    chapters.sort_by(|a, b| {
        a.number
            .unwrap_or_default()
            .total_cmp(&b.number.unwrap_or_default())
    });

    if found == 0 {
        log::warn!("No chapter links found on {}", series_url);
    } else {
        log::debug!("{} chapter links, {} numbered chapters kept", found, chapters.len());
    }

    SeriesManifest { title, chapters }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> SiteSelectors {
        SiteSelectors::compile(&SiteSettings::default()).unwrap()
    }

    fn series_html(title: Option<&str>, hrefs: &[&str]) -> String {
        let heading = title.map(|t| format!("<h1> {} </h1>", t)).unwrap_or_default();
        let items: String = hrefs
            .iter()
            .map(|h| format!(r#"<li class="wp-manga-chapter"><a href="{}">x</a></li>"#, h))
            .collect();
        format!(
            r#"<html><body>{}<ul class="main version-chap">{}</ul></body></html>"#,
            heading, items
        )
    }

    #[test]
    fn test_lazy_attribute_wins_over_src() {
        let html = r#"
            <div class="reading-content">
                <img class="wp-manga-chapter-img" src="https://cdn/placeholder.gif" data-src="  https://cdn/x.jpg ">
            </div>"#;
        let images = extract_chapter_images(html, &selectors());
        assert_eq!(images, vec!["https://cdn/x.jpg"]);
    }

    #[test]
    fn test_src_used_when_lazy_attribute_blank() {
        let html = r#"
            <img class="wp-manga-chapter-img" data-src="  " src="https://cdn/1.jpg">
            <img class="wp-manga-chapter-img" src="https://cdn/2.jpg">
            <img class="other" src="https://cdn/ad.jpg">
            <img class="wp-manga-chapter-img">"#;
        let images = extract_chapter_images(html, &selectors());
        assert_eq!(images, vec!["https://cdn/1.jpg", "https://cdn/2.jpg"]);
    }

    #[test]
    fn test_no_images_is_empty() {
        let images = extract_chapter_images("<html><body><p>nothing</p></body></html>", &selectors());
        assert!(images.is_empty());
    }

    #[test]
    fn test_chapter_page_resolves_relative_images() {
        let html = r#"<h1>Some Title</h1><img class="wp-manga-chapter-img" data-src="/uploads/01.png">"#;
        let page = parse_chapter_page(
            html,
            "https://site.example/series/foo/chapter-1/",
            &selectors(),
        );
        assert_eq!(page.title, "Some_Title");
        assert_eq!(page.image_urls, vec!["https://site.example/uploads/01.png"]);
    }

    #[test]
    fn test_series_sorted_ascending_without_unnumbered() {
        let html = series_html(
            Some("Tower of God"),
            &[
                "https://site.example/series/tog/chapter-10/",
                "https://site.example/series/tog/chapter-2/",
                "https://site.example/series/tog/prologue/",
                "https://site.example/series/tog/chapter-2.5/",
                "https://site.example/series/tog/chapter-1/",
            ],
        );
        let manifest = parse_series_page(&html, "https://site.example/series/tog/", &selectors());

        assert_eq!(manifest.title, "Tower_of_God");
        let numbers: Vec<f64> = manifest.chapters.iter().filter_map(|c| c.number).collect();
        assert_eq!(numbers, vec![1.0, 2.0, 2.5, 10.0]);
        assert!(manifest.chapters.iter().all(|c| c.number.is_some()));
    }

    #[test]
    fn test_series_dedup_and_relative_links() {
        let html = series_html(
            None,
            &["chapter-2/", "chapter-1/", "https://site.example/series/foo/chapter-2/"],
        );
        let manifest = parse_series_page(&html, "https://site.example/series/foo/", &selectors());

        assert_eq!(manifest.title, "Manga");
        let urls: Vec<&str> = manifest.chapters.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://site.example/series/foo/chapter-1/",
                "https://site.example/series/foo/chapter-2/",
            ]
        );
    }

    #[test]
    fn test_same_number_keeps_oldest_first() {
        // Page order is newest-first: "b" was listed before "a"
        let html = series_html(
            Some("X"),
            &[
                "https://site.example/series/x/chapter-3-b/",
                "https://site.example/series/x/chapter-3-a/",
            ],
        );
        let manifest = parse_series_page(&html, "https://site.example/series/x/", &selectors());
        let urls: Vec<&str> = manifest.chapters.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://site.example/series/x/chapter-3-a/",
                "https://site.example/series/x/chapter-3-b/",
            ]
        );
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let site = SiteSettings {
            chapter_image_selector: "img[[".to_string(),
            ..SiteSettings::default()
        };
        let err = SiteSelectors::compile(&site).unwrap_err();
        assert!(matches!(err, ConfigError::Selector { .. }));
    }
}
