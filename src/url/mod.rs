//! URL handling: normalization, domain extraction, and frontier admission

mod admission;
mod domain;
mod normalize;

use serde::Serialize;
use url::Url;

pub use admission::{admit, Admission, CrawlScope};
pub use domain::{extract_domain, registrable_domain, strip_www};
pub use normalize::normalize_url;

/// Whether a link stays on the source page's site or leaves it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkScope {
    /// Same registrable domain as the source page
    Internal,
    /// Different registrable domain
    External,
}

impl LinkScope {
    /// Display label used in records and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Internal => "Interno",
            Self::External => "Externo",
        }
    }

    /// Returns true for links on the source page's own site
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

impl std::fmt::Display for LinkScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classifies a link target against its source page's registrable domain
///
/// `www.` prefixes are ignored on both sides, so `www.example.com` linking
/// to `example.com` is internal.
pub fn classify_scope(source: &Url, target: &Url) -> LinkScope {
    match (registrable_domain(source), registrable_domain(target)) {
        (Some(a), Some(b)) if a == b => LinkScope::Internal,
        _ => LinkScope::External,
    }
}
