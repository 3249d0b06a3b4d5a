//! Crawl lifecycle state: phase machine and pause/resume snapshots

mod phase;
mod snapshot;

pub use phase::CrawlPhase;
pub use snapshot::CrawlSnapshot;
