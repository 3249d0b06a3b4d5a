use std::fmt;

/// Crawl lifecycle states
///
/// A new engine starts in `Stopped`. `run` moves it to `Running`; an
/// external stop request observed by the loop captures a snapshot and parks
/// it in `Paused`; a further stop while parked makes it `Stopped` (still
/// resumable from the held snapshot). The crawl reaches `Completed` when the
/// frontier drains, the page ceiling is hit, or a resume is refused because
/// nothing remains to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// The loop is actively draining the frontier
    Running,
    /// A stop request was honored; a snapshot is held for resume
    Paused,
    /// Not running; resumable if a snapshot with pending URLs exists
    Stopped,
    /// Terminal: the crawl finished
    Completed,
}

impl CrawlPhase {
    /// Returns true if no further processing will happen without a resume
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if `resume` may restore a snapshot from this phase
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::Paused | Self::Stopped)
    }

    /// Returns true while the crawl loop is draining the frontier
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlPhase::Running.is_terminal());
        assert!(!CrawlPhase::Paused.is_terminal());
        assert!(!CrawlPhase::Stopped.is_terminal());
        assert!(CrawlPhase::Completed.is_terminal());
    }

    #[test]
    fn test_is_resumable() {
        assert!(!CrawlPhase::Running.is_resumable());
        assert!(CrawlPhase::Paused.is_resumable());
        assert!(CrawlPhase::Stopped.is_resumable());
        assert!(!CrawlPhase::Completed.is_resumable());
    }

    #[test]
    fn test_is_running() {
        assert!(CrawlPhase::Running.is_running());
        assert!(!CrawlPhase::Paused.is_running());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Running), "running");
        assert_eq!(format!("{}", CrawlPhase::Paused), "paused");
        assert_eq!(format!("{}", CrawlPhase::Stopped), "stopped");
        assert_eq!(format!("{}", CrawlPhase::Completed), "completed");
    }
}
