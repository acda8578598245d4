use crate::config::{BrowserSettings, DEFAULT_USER_AGENT};
use std::time::Duration;

/// Flags that keep headless Chrome from advertising automation
const STEALTH_FLAGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
];

/// Configuration for browser instances
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window size
    pub window_size: (u32, u32),

    /// User agent applied to every tab
    pub user_agent: String,

    /// Upper bound for the initial page load
    pub navigation_timeout: Duration,

    /// Fixed wait used when no readiness signal is available
    pub settle_delay: Duration,

    /// How long to poll for a readiness selector before settling
    pub ready_timeout: Duration,

    /// Additional Chrome flags
    pub chrome_flags: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(3),
            ready_timeout: Duration::from_secs(10),
            chrome_flags: STEALTH_FLAGS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl From<&BrowserSettings> for BrowserConfig {
    fn from(settings: &BrowserSettings) -> Self {
        let mut chrome_flags: Vec<String> = STEALTH_FLAGS.iter().map(|f| f.to_string()).collect();
        for flag in &settings.chrome_flags {
            if !chrome_flags.contains(flag) {
                chrome_flags.push(flag.clone());
            }
        }
        Self {
            headless: settings.headless,
            window_size: settings.window_size,
            user_agent: settings.user_agent.clone(),
            navigation_timeout: settings.navigation_timeout(),
            settle_delay: settings.settle_delay(),
            ready_timeout: settings.ready_timeout(),
            chrome_flags,
        }
    }
}

impl BrowserConfig {
    /// `--user-agent=...` flag for the launch command line
    pub fn user_agent_flag(&self) -> String {
        format!("--user-agent={}", self.user_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.window_size, (1920, 1080));
        assert_eq!(config.navigation_timeout, Duration::from_secs(60));
        assert_eq!(config.settle_delay, Duration::from_secs(3));
        assert!(config
            .chrome_flags
            .iter()
            .any(|f| f.contains("AutomationControlled")));
    }

    #[test]
    fn test_from_settings() {
        let settings = BrowserSettings {
            headless: false,
            settle_delay_ms: 500,
            chrome_flags: vec!["--no-sandbox".to_string(), "--disable-dev-shm-usage".to_string()],
            ..BrowserSettings::default()
        };
        let config = BrowserConfig::from(&settings);
        assert!(!config.headless);
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert!(config.chrome_flags.contains(&"--no-sandbox".to_string()));
        assert_eq!(
            config
                .chrome_flags
                .iter()
                .filter(|f| *f == "--disable-dev-shm-usage")
                .count(),
            1
        );
        assert!(config.user_agent_flag().starts_with("--user-agent=Mozilla/5.0"));
    }
}
