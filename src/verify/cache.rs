use crate::verify::LinkStatus;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-lifetime cache of the last observed status per URL
///
/// Consulted before reissuing a liveness check; also backs the admission
/// rule that a URL with a cached status below 400 is enqueued without a
/// fresh network call, while one at 400 or above is never re-enqueued.
/// Synthetic circuit-open results are not cached so the URL gets a real
/// check once the circuit closes.
#[derive(Debug, Default)]
pub struct StatusCache {
    inner: Mutex<HashMap<String, LinkStatus>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<LinkStatus> {
        self.lock().get(url).copied()
    }

    pub fn put(&self, url: &str, status: LinkStatus) {
        if matches!(status, LinkStatus::CircuitOpen) {
            return;
        }
        self.lock().insert(url.to_string(), status);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, LinkStatus>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
