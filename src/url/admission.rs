use crate::url::domain::registrable_domain;
use std::collections::HashSet;
use url::Url;

/// File extensions that never correspond to crawlable pages
const EXCLUDED_EXTENSIONS: &[&str] = &[
    // Images and documents
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".ico", ".svg", ".webp",
    // Web resources
    ".css", ".js", ".json", ".xml", ".txt",
    // Fonts
    ".woff", ".woff2", ".ttf", ".eot", ".otf",
    // Media
    ".mp3", ".mp4", ".wav", ".ogg", ".webm",
    // Source maps
    ".map",
];

/// Image extensions among the excluded set; these become image records
/// instead of being silently dropped
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".ico", ".svg", ".webp"];

/// Path fragments typical of bundler output and static asset trees
const STATIC_PATH_PATTERNS: &[&str] = &[
    "/_next/static/",
    "/static/",
    "/assets/",
    "/dist/",
    "/build/",
    "/themes/",
];

/// Which URLs are eligible for the frontier
///
/// In whole-site mode a candidate must live on the seed's registrable domain;
/// in explicit-URL mode it must be a member of the caller-supplied set.
#[derive(Debug, Clone)]
pub enum CrawlScope {
    /// Whole-site crawl rooted at this registrable domain (www-stripped)
    Domain(String),
    /// Explicit URL list; only members are analyzed
    UrlSet(HashSet<String>),
}

impl CrawlScope {
    fn contains(&self, url: &Url) -> bool {
        match self {
            Self::Domain(seed_domain) => {
                registrable_domain(url).as_deref() == Some(seed_domain.as_str())
            }
            Self::UrlSet(set) => set.contains(url.as_str()),
        }
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// URL may enter the frontier
    Eligible,
    /// URL points at an image; record it, do not crawl it
    Image,
    /// URL is not crawlable
    Rejected,
}

impl Admission {
    /// Returns true if the URL may enter the frontier
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Decides whether a normalized URL is eligible for the frontier
///
/// Rejects non-HTTP(S) schemes, non-page file extensions, and known
/// static-asset path patterns, and enforces the crawl scope. Image
/// extensions are reported as [`Admission::Image`] so the caller can record
/// them. This function never fails; anything it cannot make sense of is
/// simply not admissible.
pub fn admit(url: &Url, scope: &CrawlScope) -> Admission {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Admission::Rejected;
    }

    if url.host_str().is_none() {
        return Admission::Rejected;
    }

    let lower = url.as_str().to_lowercase();

    if has_extension(&lower, IMAGE_EXTENSIONS) {
        return Admission::Image;
    }

    if has_extension(&lower, EXCLUDED_EXTENSIONS) {
        return Admission::Rejected;
    }

    if STATIC_PATH_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Admission::Rejected;
    }

    if !scope.contains(url) {
        return Admission::Rejected;
    }

    Admission::Eligible
}

fn has_extension(lower_url: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| lower_url.ends_with(ext))
}
