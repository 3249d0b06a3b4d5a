//! Append-only result store populated by the crawl loop
//!
//! Page, image, and link records accumulate here together with the
//! duplicate-text indexes. Verifier worker pools append concurrently while a
//! page is being processed, so all mutation goes through one internal lock.
//! The external report generator reads a snapshot and never mutates
//! anything.

mod duplicates;
mod records;

pub use duplicates::DuplicateIndex;
pub use records::{ImageRecord, ImageState, LinkRecord, PageRecord, PageStatus};

use std::sync::Mutex;

#[derive(Debug, Default)]
struct StoreInner {
    pages: Vec<PageRecord>,
    images: Vec<ImageRecord>,
    links: Vec<LinkRecord>,
    duplicates: DuplicateIndex,
}

/// Thread-safe, append-only collection of crawl results
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<StoreInner>,
}

/// Point-in-time copy of the store contents
///
/// This is what the report boundary consumes and what crawl snapshots carry.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub pages: Vec<PageRecord>,
    pub images: Vec<ImageRecord>,
    pub links: Vec<LinkRecord>,
    pub duplicates: DuplicateIndex,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the single record produced for a processed URL
    pub fn append_page(&self, record: PageRecord) {
        self.lock().pages.push(record);
    }

    pub fn append_image(&self, record: ImageRecord) {
        self.lock().images.push(record);
    }

    pub fn append_images(&self, records: Vec<ImageRecord>) {
        self.lock().images.extend(records);
    }

    pub fn append_links(&self, records: Vec<LinkRecord>) {
        self.lock().links.extend(records);
    }

    /// Records duplicate-detection entries for a page's extracted texts
    pub fn record_duplicates(
        &self,
        url: &str,
        title: Option<&str>,
        h1s: &[String],
        description: Option<&str>,
    ) {
        let mut inner = self.lock();
        if let Some(title) = title {
            inner.duplicates.record_title(title, url);
        }
        for h1 in h1s {
            inner.duplicates.record_h1(h1, url);
        }
        if let Some(description) = description {
            inner.duplicates.record_description(description, url);
        }
    }

    pub fn page_count(&self) -> usize {
        self.lock().pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.lock().images.len()
    }

    pub fn link_count(&self) -> usize {
        self.lock().links.len()
    }

    /// Number of pages recorded with a terminal error status
    pub fn error_page_count(&self) -> usize {
        self.lock()
            .pages
            .iter()
            .filter(|p| matches!(p.status, PageStatus::Error))
            .count()
    }

    /// Copies the full store contents
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.lock();
        StoreSnapshot {
            pages: inner.pages.clone(),
            images: inner.images.clone(),
            links: inner.links.clone(),
            duplicates: inner.duplicates.clone(),
        }
    }

    /// Replaces the store contents from a snapshot (crawl resume)
    pub fn restore(&self, snapshot: StoreSnapshot) {
        let mut inner = self.lock();
        inner.pages = snapshot.pages;
        inner.images = snapshot.images;
        inner.links = snapshot.links;
        inner.duplicates = snapshot.duplicates;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // A poisoned store lock means a panic mid-append; the data is
        // append-only so the contents are still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
