use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use rust_manga_downloader::browser::{BrowserConfig, ChromeRenderer};
use rust_manga_downloader::config::Config;
use rust_manga_downloader::models::ChapterRange;
use rust_manga_downloader::{CrawlRequest, Crawler};
use std::path::PathBuf;
use std::sync::Arc;

/// Download manga chapters from WP-Manga (Madara) sites
#[derive(Parser, Debug)]
#[command(name = "manga-dl", version, about)]
struct Cli {
    /// Series or chapter URL
    url: String,

    /// Start chapter number (inclusive, needs --to)
    #[arg(long = "from", value_name = "NUMBER")]
    from: Option<f64>,

    /// End chapter number (inclusive, needs --from)
    #[arg(long = "to", value_name = "NUMBER")]
    to: Option<f64>,

    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the download directory from the config
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

/// Use log4rs.yml when present, otherwise log to the console at info level
fn init_logging() {
    if log4rs::init_file("log4rs.yml", Default::default()).is_ok() {
        return;
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l:<5})} {m}{n}")))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("Failed to initialize logging: {}", e);
            }
        }
        Err(e) => eprintln!("Invalid logging configuration: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(dir) = &cli.output_dir {
        cfg.download_dir = dir.display().to_string();
    }

    if cli.from.is_some() != cli.to.is_some() {
        log::warn!("Both --from and --to are needed for a range, downloading every chapter");
    }
    let range = ChapterRange::from_bounds(cli.from, cli.to);

    log::info!(
        "Browser: headless={}, timeout={}s, settle={}ms",
        cfg.browser.headless,
        cfg.browser.navigation_timeout_secs,
        cfg.browser.settle_delay_ms
    );
    let renderer = ChromeRenderer::launch(BrowserConfig::from(&cfg.browser))?;
    let crawler = Crawler::new(&cfg, Arc::new(renderer))?;
    log::info!("Saving to {}", crawler.output_dir().display());

    let request = CrawlRequest { url: cli.url, range };
    crawler.run(&request).await?;

    Ok(())
}
