use serde::Deserialize;

/// Default browser user agent sent with plain HTTP requests
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Seed URL for whole-site crawls (also used as the report's domain label)
    #[serde(rename = "base-url", default)]
    pub base_url: String,

    /// Explicit URL list; when set, only these URLs are analyzed
    #[serde(rename = "specific-urls", default)]
    pub specific_urls: Option<Vec<String>>,

    /// Maximum pages to analyze; 0 or 1 means unlimited
    #[serde(rename = "max-pages", default)]
    pub max_pages: usize,

    /// Delay between page requests, in milliseconds
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Whether images are collected and verified
    #[serde(rename = "analyze-images", default = "default_true")]
    pub analyze_images: bool,

    /// Whether links are collected and verified
    #[serde(rename = "analyze-links", default = "default_true")]
    pub analyze_links: bool,

    /// Whether rendered fetches run a headless browser
    #[serde(default = "default_true")]
    pub headless: bool,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub render: RenderPoolConfig,

    #[serde(default)]
    pub heuristics: RenderHeuristics,

    #[serde(default)]
    pub verifier: VerifierConfig,
}

impl CrawlConfig {
    /// Creates a whole-site configuration with defaults for the given seed
    pub fn for_site(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            specific_urls: None,
            max_pages: 0,
            delay_ms: default_delay_ms(),
            analyze_images: true,
            analyze_links: true,
            headless: true,
            user_agent: default_user_agent(),
            render: RenderPoolConfig::default(),
            heuristics: RenderHeuristics::default(),
            verifier: VerifierConfig::default(),
        }
    }

    /// Creates an explicit-URL-list configuration with defaults
    pub fn for_urls(urls: Vec<String>) -> Self {
        let base = urls.first().cloned().unwrap_or_default();
        Self {
            specific_urls: Some(urls),
            ..Self::for_site(base)
        }
    }

    /// Returns true when the page ceiling is disabled (0 or 1 sentinel)
    pub fn is_unlimited(&self) -> bool {
        self.max_pages <= 1
    }

    /// The page ceiling, if one is in effect
    pub fn page_ceiling(&self) -> Option<usize> {
        if self.is_unlimited() {
            None
        } else {
            Some(self.max_pages)
        }
    }
}

/// Render pool tuning
#[derive(Debug, Clone, Deserialize)]
pub struct RenderPoolConfig {
    /// Number of reusable browser pages (and the concurrent-render limit)
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: usize,

    /// Maximum wait for a free page slot, in milliseconds
    #[serde(rename = "acquire-timeout-ms", default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,

    /// Primary navigation timeout (load event), in milliseconds
    #[serde(rename = "nav-timeout-ms", default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,

    /// Retry navigation timeout (DOM-ready wait), in milliseconds
    #[serde(rename = "retry-nav-timeout-ms", default = "default_retry_nav_timeout_ms")]
    pub retry_nav_timeout_ms: u64,

    /// Fixed backoff before the navigation retry, in milliseconds
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for RenderPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            nav_timeout_ms: default_nav_timeout_ms(),
            retry_nav_timeout_ms: default_retry_nav_timeout_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Thresholds for the render-or-not decision
///
/// The defaults were tuned empirically against client-rendered sites; they
/// are configuration rather than constants because no single set of values
/// is right for every site.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderHeuristics {
    /// Body text shorter than this counts as "textually empty"
    #[serde(rename = "min-text-chars", default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Raw HTML larger than this counts as "structurally large"
    #[serde(rename = "skeleton-html-bytes", default = "default_skeleton_html_bytes")]
    pub skeleton_html_bytes: usize,

    /// Text below this with zero headings also counts as skeleton markup
    #[serde(rename = "sparse-text-chars", default = "default_sparse_text_chars")]
    pub sparse_text_chars: usize,

    /// Minimum extractable text for a plain fetch to be considered usable
    #[serde(rename = "min-extract-chars", default = "default_min_extract_chars")]
    pub min_extract_chars: usize,
}

impl Default for RenderHeuristics {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            skeleton_html_bytes: default_skeleton_html_bytes(),
            sparse_text_chars: default_sparse_text_chars(),
            min_extract_chars: default_min_extract_chars(),
        }
    }
}

/// Link/image verifier tuning
#[derive(Debug, Clone, Deserialize)]
pub struct VerifierConfig {
    /// Concurrent link checks per page
    #[serde(rename = "link-workers", default = "default_link_workers")]
    pub link_workers: usize,

    /// Concurrent image checks per page
    #[serde(rename = "image-workers", default = "default_image_workers")]
    pub image_workers: usize,

    /// Per-check timeout, in milliseconds
    #[serde(rename = "check-timeout-ms", default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,

    /// Retries after a transport-level failure
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between retries, in milliseconds (scales with attempt)
    #[serde(rename = "retry-backoff-ms", default = "default_verify_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Consecutive failures before a domain's circuit opens
    #[serde(rename = "circuit-threshold", default = "default_circuit_threshold")]
    pub circuit_threshold: u32,

    /// Circuit cooldown window, in milliseconds
    #[serde(rename = "circuit-cooldown-ms", default = "default_circuit_cooldown_ms")]
    pub circuit_cooldown_ms: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            link_workers: default_link_workers(),
            image_workers: default_image_workers(),
            check_timeout_ms: default_check_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_verify_backoff_ms(),
            circuit_threshold: default_circuit_threshold(),
            circuit_cooldown_ms: default_circuit_cooldown_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_pool_size() -> usize {
    8
}

fn default_acquire_timeout_ms() -> u64 {
    15_000
}

fn default_nav_timeout_ms() -> u64 {
    60_000
}

fn default_retry_nav_timeout_ms() -> u64 {
    20_000
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_min_text_chars() -> usize {
    50
}

fn default_skeleton_html_bytes() -> usize {
    8192
}

fn default_sparse_text_chars() -> usize {
    100
}

fn default_min_extract_chars() -> usize {
    100
}

fn default_link_workers() -> usize {
    6
}

fn default_image_workers() -> usize {
    4
}

fn default_check_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_verify_backoff_ms() -> u64 {
    250
}

fn default_circuit_threshold() -> u32 {
    3
}

fn default_circuit_cooldown_ms() -> u64 {
    60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_site_defaults() {
        let config = CrawlConfig::for_site("https://example.com");
        assert_eq!(config.base_url, "https://example.com");
        assert!(config.specific_urls.is_none());
        assert!(config.analyze_images);
        assert!(config.analyze_links);
        assert!(config.headless);
        assert_eq!(config.delay_ms, 500);
    }

    #[test]
    fn test_for_urls_takes_first_as_base() {
        let config = CrawlConfig::for_urls(vec![
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
        ]);
        assert_eq!(config.base_url, "https://example.com/a");
        assert_eq!(config.specific_urls.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_unlimited_sentinel() {
        let mut config = CrawlConfig::for_site("https://example.com");
        config.max_pages = 0;
        assert!(config.is_unlimited());
        assert_eq!(config.page_ceiling(), None);

        config.max_pages = 1;
        assert!(config.is_unlimited());

        config.max_pages = 2;
        assert!(!config.is_unlimited());
        assert_eq!(config.page_ceiling(), Some(2));
    }

    #[test]
    fn test_heuristics_defaults() {
        let h = RenderHeuristics::default();
        assert_eq!(h.min_text_chars, 50);
        assert_eq!(h.skeleton_html_bytes, 8192);
        assert_eq!(h.sparse_text_chars, 100);
        assert_eq!(h.min_extract_chars, 100);
    }

    #[test]
    fn test_verifier_defaults() {
        let v = VerifierConfig::default();
        assert_eq!(v.link_workers, 6);
        assert_eq!(v.image_workers, 4);
        assert_eq!(v.circuit_threshold, 3);
        assert_eq!(v.circuit_cooldown_ms, 60_000);
    }
}
