use std::collections::{HashSet, VecDeque};

/// Breadth-first frontier of pending URLs
///
/// URLs are popped in discovery (FIFO) order. Membership sets reject
/// duplicates in O(1) and maintain the invariant that no URL is ever both
/// pending and visited. Callers normalize URLs before they get here.
#[derive(Debug, Default)]
pub struct Frontier {
    pending: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier pre-loaded with seed URLs
    pub fn with_seeds(seeds: impl IntoIterator<Item = String>) -> Self {
        let mut frontier = Self::new();
        for seed in seeds {
            frontier.enqueue(seed);
        }
        frontier
    }

    /// Adds a URL unless it is already pending or visited
    ///
    /// Returns true if the URL was added.
    pub fn enqueue(&mut self, url: String) -> bool {
        if self.queued.contains(&url) || self.visited.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Removes and returns the oldest pending URL
    pub fn pop(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Marks a URL as processed
    pub fn mark_visited(&mut self, url: &str) {
        self.queued.remove(url);
        self.visited.insert(url.to_string());
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn is_queued(&self, url: &str) -> bool {
        self.queued.contains(url)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Copies the visited set and the pending queue in order
    pub fn snapshot(&self) -> (HashSet<String>, Vec<String>) {
        (
            self.visited.clone(),
            self.pending.iter().cloned().collect(),
        )
    }

    /// Rebuilds a frontier from snapshot state
    pub fn restore(visited: HashSet<String>, pending: Vec<String>) -> Self {
        let mut frontier = Self {
            pending: VecDeque::new(),
            queued: HashSet::new(),
            visited,
        };
        for url in pending {
            frontier.enqueue(url);
        }
        frontier
    }
}
