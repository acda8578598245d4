use super::config::BrowserConfig;
use super::manager::{BrowserError, BrowserManager};
use super::scraper::BrowserScraper;

/// Turns a URL into fully rendered HTML.
///
/// Implementations block; async callers run them on the blocking pool.
pub trait PageRenderer: Send + Sync {
    /// Render `url`. When `ready_selector` is given, return as soon as it
    /// matches; otherwise (or when it never shows up) wait the settle delay.
    fn render(&self, url: &str, ready_selector: Option<&str>) -> Result<String, BrowserError>;
}

/// Headless Chrome renderer sharing one browser process across renders
pub struct ChromeRenderer {
    manager: BrowserManager,
}

impl ChromeRenderer {
    pub fn launch(config: BrowserConfig) -> Result<Self, BrowserError> {
        Ok(Self {
            manager: BrowserManager::new(config)?,
        })
    }

    fn render_in_tab(
        &self,
        scraper: &BrowserScraper,
        url: &str,
        ready_selector: Option<&str>,
    ) -> Result<String, BrowserError> {
        let config = self.manager.config();
        scraper.navigate(url)?;

        match ready_selector {
            Some(selector) => {
                match scraper.wait_for_selector_with_timeout(selector, config.ready_timeout) {
                    Ok(()) => log::debug!("{} ready ({} matched)", url, selector),
                    Err(_) => {
                        log::debug!(
                            "{} did not match {} within {:?}, settling for {:?}",
                            url,
                            selector,
                            config.ready_timeout,
                            config.settle_delay
                        );
                        scraper.settle(config.settle_delay);
                    }
                }
            }
            None => scraper.settle(config.settle_delay),
        }

        scraper.get_html()
    }
}

impl PageRenderer for ChromeRenderer {
    fn render(&self, url: &str, ready_selector: Option<&str>) -> Result<String, BrowserError> {
        log::info!("Rendering {}", url);
        let scraper = BrowserScraper::new(self.manager.new_tab()?);
        let html = self.render_in_tab(&scraper, url, ready_selector);
        scraper.close();
        html
    }
}
