// Library interface for rust_manga_downloader
// The binary and the integration tests drive the pipeline through these modules

pub mod browser;
pub mod completion;
pub mod config;
pub mod crawler;
pub mod downloader;
pub mod error;
pub mod helpers;
pub mod models;
pub mod parser;

pub use crawler::{CrawlRequest, Crawler};
pub use error::CrawlError;
