use crate::url::LinkScope;
use crate::verify::LinkStatus;
use serde::Serialize;
use std::fmt;

/// HTTP status of a processed page, or a terminal error marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageStatus {
    /// HTTP status code of the response that produced the record
    Code(u16),
    /// The page could not be fetched at all
    Error,
}

impl PageStatus {
    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Code(code) if (200..300).contains(code))
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// One record per crawled URL; created once and never mutated afterward
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub status: PageStatus,
    pub title: Option<String>,
    pub title_length: usize,
    pub description: Option<String>,
    pub description_length: usize,
    pub h1: Option<String>,
    pub h1_count: usize,
    pub h2: Option<String>,
    pub keywords: Option<String>,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub anchors: Option<String>,
    pub word_count: usize,
    pub url_length: usize,
    pub hreflang_es: Option<String>,
    pub hreflang_en: Option<String>,
    pub hreflang_pt: Option<String>,
}

impl PageRecord {
    /// Minimal record for a URL whose fetch or extraction produced nothing
    pub fn error_stub(url: &str, status: PageStatus) -> Self {
        Self {
            url: url.to_string(),
            status,
            title: None,
            title_length: 0,
            description: None,
            description_length: 0,
            h1: None,
            h1_count: 0,
            h2: None,
            keywords: None,
            canonical: None,
            robots: None,
            anchors: None,
            word_count: 0,
            url_length: url.len(),
            hreflang_es: None,
            hreflang_en: None,
            hreflang_pt: None,
        }
    }
}

/// Verification state of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageState {
    /// HEAD check returned 200
    Funcional,
    /// HEAD check failed or returned an error status
    NoFuncional,
    /// Never checked (direct image links, disabled verification)
    NoVerificado,
}

impl ImageState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Funcional => "Funcional",
            Self::NoFuncional => "No funcional",
            Self::NoVerificado => "No verificado",
        }
    }
}

impl fmt::Display for ImageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One record per image discovered during page processing
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub source_page: String,
    pub image_url: String,
    pub title: String,
    pub alt: String,
    /// Inferred type (JPG, PNG, ...) or "Desconocido"
    pub image_type: String,
    /// Human-readable size ("12.3 KB"); "0 KB" when unknown
    pub size: String,
    pub state: ImageState,
}

impl ImageRecord {
    /// Record for an admission-rejected direct image URL, never verified
    pub fn unverified(url: &str) -> Self {
        let image_type = url
            .rsplit('.')
            .next()
            .map(|ext| ext.to_uppercase())
            .unwrap_or_else(|| "Desconocido".to_string());
        Self {
            source_page: url.to_string(),
            image_url: url.to_string(),
            title: String::new(),
            alt: String::new(),
            image_type,
            size: "0 KB".to_string(),
            state: ImageState::NoVerificado,
        }
    }
}

/// One record per outbound link found on a page
#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    pub source_page: String,
    pub source_domain: String,
    pub target_url: String,
    pub target_domain: String,
    pub scope: LinkScope,
    pub anchor_text: String,
    pub status: LinkStatus,
}
