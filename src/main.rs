//! Sondeo command-line entry point
//!
//! Thin shell around the crawl engine: argument parsing, logging setup,
//! progress printing, and report generation on completion.

use clap::Parser;
use sondeo::config::{load_config_with_hash, CrawlConfig};
use sondeo::crawler::{Crawler, ProgressCallback, ProgressUpdate};
use sondeo::output::{write_report, ReportMeta};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Sondeo: a website SEO crawler and auditor
///
/// Crawls a site (or an explicit URL list), extracts SEO signals per page,
/// verifies links and images, and writes a CSV report.
#[derive(Parser, Debug)]
#[command(name = "sondeo")]
#[command(version = "1.0.0")]
#[command(about = "Website SEO crawler and auditor", long_about = None)]
struct Cli {
    /// Seed URL to crawl (ignored when --urls-file is given)
    #[arg(value_name = "URL", required_unless_present_any = ["urls_file", "config"])]
    url: Option<String>,

    /// File with one URL per line; only these URLs are analyzed
    #[arg(long, value_name = "FILE")]
    urls_file: Option<PathBuf>,

    /// Optional TOML configuration file; CLI flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum pages to analyze (0 or 1 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_pages: usize,

    /// Delay between page requests, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Skip image collection and verification
    #[arg(long)]
    no_images: bool,

    /// Skip link collection and verification
    #[arg(long)]
    no_links: bool,

    /// Run the rendering browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Directory for the CSV report (skipped when not given)
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Capture a full-page screenshot of the seed URL and exit
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let is_url_list = config.specific_urls.is_some();
    let target = config.base_url.clone();

    let mut crawler = Crawler::new(config)?;

    if let Some(path) = &cli.screenshot {
        let url = cli.url.clone().unwrap_or(target);
        tracing::info!("Capturing screenshot of {}", url);
        crawler.capture_screenshot(&url, Some(path.as_path())).await?;
        println!("Captura guardada en: {}", path.display());
        return Ok(());
    }

    // Ctrl-C requests a clean stop; the loop honors it within one tick
    let handle = crawler.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            handle.stop();
        }
    });

    let progress: ProgressCallback = Arc::new(|update: ProgressUpdate| {
        println!("{}", update.message);
        if let Some(counts) = update.counts {
            let total = counts
                .total
                .map(|t| t.to_string())
                .unwrap_or_else(|| "∞".to_string());
            println!(
                "    Visitadas: {}/{} | Pendientes: {}",
                counts.completed, total, counts.pending
            );
        }
    });

    let start = Instant::now();
    crawler.run(Some(progress), None).await?;

    let results = crawler.results();
    println!(
        "\nPáginas: {} | Enlaces: {} | Imágenes: {}",
        results.pages.len(),
        results.links.len(),
        results.images.len()
    );

    if let Some(dir) = &cli.report_dir {
        let meta = if is_url_list {
            ReportMeta::url_list(&target, start.elapsed())
        } else {
            ReportMeta::whole_site(&target, start.elapsed())
        };
        let written = write_report(&results, dir, &meta)?;
        println!("Reporte generado ({} archivos) en: {}", written.len(), dir.display());
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sondeo=info,warn"),
            1 => EnvFilter::new("sondeo=debug,info"),
            2 => EnvFilter::new("sondeo=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges the optional config file with CLI flags (flags win)
fn build_config(cli: &Cli) -> Result<CrawlConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash);
            config
        }
        None => CrawlConfig::for_site(""),
    };

    if let Some(path) = &cli.urls_file {
        let content = std::fs::read_to_string(path)?;
        let urls: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
        if let Some(first) = urls.first() {
            config.base_url = first.clone();
        }
        config.specific_urls = Some(urls);
    } else if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }

    if cli.max_pages > 0 {
        config.max_pages = cli.max_pages;
    }
    if let Some(delay) = cli.delay_ms {
        config.delay_ms = delay;
    }
    if cli.no_images {
        config.analyze_images = false;
    }
    if cli.no_links {
        config.analyze_links = false;
    }
    if cli.headed {
        config.headless = false;
    }

    Ok(config)
}
