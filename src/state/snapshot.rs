use crate::store::StoreSnapshot;
use std::collections::HashSet;

/// Point-in-time crawl state captured when a stop request is honored
///
/// Holds everything needed to continue the crawl later in the same process:
/// the visited set, the remaining frontier in order, the accumulated record
/// collections, and the two extraction toggles. Captured and restored as a
/// unit so a pause/resume cycle cannot observe a half-updated crawl.
#[derive(Debug, Clone)]
pub struct CrawlSnapshot {
    /// URLs already processed
    pub visited: HashSet<String>,
    /// URLs still pending, in frontier order
    pub pending: Vec<String>,
    /// Accumulated records at the moment of capture
    pub store: StoreSnapshot,
    /// Whether image analysis was enabled
    pub analyze_images: bool,
    /// Whether link analysis was enabled
    pub analyze_links: bool,
}

impl CrawlSnapshot {
    /// Returns true when nothing remains to crawl
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}
