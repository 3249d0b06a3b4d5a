//! Crawl engine: frontier, plain fetching, fetch strategy selection, and
//! the run/pause/stop/resume loop

mod engine;
mod fetcher;
mod frontier;
mod strategy;

pub use engine::{
    format_elapsed, CompletionCallback, CrawlHandle, Crawler, ProgressCallback, ProgressCounts,
    ProgressUpdate,
};
pub use fetcher::{build_http_client, fetch_page, FetchError, PlainResponse};
pub use frontier::Frontier;
pub use strategy::{choose_strategy, FetchStrategy};
