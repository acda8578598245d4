use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Root under which `<manga_title>/<chapter>/` folders are created
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub download: DownloadSettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub resume: ResumeSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserSettings {
    /// Browser headless mode
    #[serde(default = "default_true")]
    pub headless: bool,

    /// User agent presented by every tab
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound for initial page load, in seconds
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Fixed wait after load when no readiness selector shows up, in milliseconds
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// How long to poll for a readiness selector, in seconds
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,

    #[serde(default = "default_window_size")]
    pub window_size: (u32, u32),

    /// Additional Chrome flags
    #[serde(default)]
    pub chrome_flags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-image request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum in-flight image requests within one chapter
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Extension used when an image URL has none
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteSettings {
    /// Substring that marks a series listing URL
    #[serde(default = "default_series_marker")]
    pub series_path_marker: String,

    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    /// Folder name used when the page has no title heading
    #[serde(default = "default_title")]
    pub default_title: String,

    #[serde(default = "default_chapter_link_selector")]
    pub chapter_link_selector: String,

    #[serde(default = "default_chapter_image_selector")]
    pub chapter_image_selector: String,

    /// Lazy-load attributes checked before `src`, in order
    #[serde(default = "default_lazy_attributes")]
    pub lazy_attributes: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResumePolicy {
    /// Skip a chapter only when its completion marker says every page was saved
    #[default]
    Marker,
    /// Skip a chapter whenever its folder exists and is not empty
    NonEmpty,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ResumeSettings {
    #[serde(default)]
    pub policy: ResumePolicy,
}

fn default_true() -> bool { true }
fn default_download_dir() -> String { ".".to_string() }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }
fn default_navigation_timeout() -> u64 { 60 }
fn default_settle_delay() -> u64 { 3000 }
fn default_ready_timeout() -> u64 { 10 }
fn default_window_size() -> (u32, u32) { (1920, 1080) }
fn default_timeout() -> u64 { 30 }
fn default_concurrency() -> usize { 1 }
fn default_extension() -> String { ".jpg".to_string() }
fn default_series_marker() -> String { "/series/".to_string() }
fn default_title_selector() -> String { "h1".to_string() }
fn default_title() -> String { "Manga".to_string() }
fn default_chapter_link_selector() -> String { "li.wp-manga-chapter a".to_string() }
fn default_chapter_image_selector() -> String { "img.wp-manga-chapter-img".to_string() }
fn default_lazy_attributes() -> Vec<String> {
    vec!["data-src".to_string(), "data-lazy-src".to_string()]
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: default_user_agent(),
            navigation_timeout_secs: default_navigation_timeout(),
            settle_delay_ms: default_settle_delay(),
            ready_timeout_secs: default_ready_timeout(),
            window_size: default_window_size(),
            chrome_flags: Vec::new(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            concurrency: default_concurrency(),
            default_extension: default_extension(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            series_path_marker: default_series_marker(),
            title_selector: default_title_selector(),
            default_title: default_title(),
            chapter_link_selector: default_chapter_link_selector(),
            chapter_image_selector: default_chapter_image_selector(),
            lazy_attributes: default_lazy_attributes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            browser: BrowserSettings::default(),
            download: DownloadSettings::default(),
            site: SiteSettings::default(),
            resume: ResumeSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<Config>(content)?)
    }
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

impl DownloadSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid CSS selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}
