//! Browser rendering for script-driven manga pages
//!
//! Chapter images on WP-Manga sites are injected by client-side scripts, so
//! pages are rendered in headless Chrome before parsing.
//!
//! # Example
//!
//! ```no_run
//! use rust_manga_downloader::browser::{BrowserConfig, ChromeRenderer, PageRenderer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let renderer = ChromeRenderer::launch(BrowserConfig::default())?;
//! let html = renderer.render("https://example.com", Some("h1"))?;
//! println!("Extracted {} bytes of HTML", html.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;
pub mod renderer;
pub mod scraper;

pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use renderer::{ChromeRenderer, PageRenderer};
pub use scraper::BrowserScraper;
