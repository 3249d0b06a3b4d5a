//! Content extraction: SEO fields, outbound links, and image candidates
//!
//! Everything here works on a raw HTML string and is tolerant of missing or
//! malformed markup; a field that cannot be extracted is simply absent.

mod keywords;
mod text;

pub use keywords::{top_keywords, word_count};
pub use text::{document_text, heading_count, main_container, visible_text};

use crate::url::{classify_scope, LinkScope};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Class fragments that stand in for an H1 when no real one exists
const H1_CLASS_HINTS: &[&str] = &[
    "title",
    "page-title",
    "heading",
    "hero-title",
    "site-title",
    "titulo",
    "titulo-pagina",
];

/// Class fragments that stand in for H2 headings
const H2_CLASS_HINTS: &[&str] = &["subtitle", "sub-title", "section-title", "heading-2", "subtitulo"];

/// How many keywords a page record carries
const KEYWORD_LIMIT: usize = 10;

/// An outbound link discovered on a page
#[derive(Debug, Clone)]
pub struct LinkCandidate {
    /// Absolute target URL
    pub url: String,
    /// Anchor text, possibly empty
    pub anchor_text: String,
    /// Internal or external relative to the source page
    pub scope: LinkScope,
    /// The element's hreflang attribute, when present
    pub hreflang: Option<String>,
}

/// An image discovered on a page, pending verification
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub source_page: String,
    pub url: String,
    pub title: String,
    pub alt: String,
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default)]
pub struct PageExtract {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub hreflang_es: Option<String>,
    pub hreflang_en: Option<String>,
    pub hreflang_pt: Option<String>,
    pub h1s: Vec<String>,
    pub h2s: Vec<String>,
    pub word_count: usize,
    pub keywords: Vec<String>,
    pub links: Vec<LinkCandidate>,
    pub images: Vec<ImageCandidate>,
    /// hreflang alternate targets, resubmitted to the frontier
    pub alternates: Vec<String>,
}

/// Structural shape of a document, used by the fetch-strategy selector
#[derive(Debug, Clone, Copy)]
pub struct StructuralSummary {
    pub has_title: bool,
    pub h1_like_count: usize,
    pub heading_count: usize,
    pub text_length: usize,
}

/// Summarizes a document's structure without full extraction
pub fn structural_summary(html: &str) -> StructuralSummary {
    let document = Html::parse_document(html);
    StructuralSummary {
        has_title: extract_title(&document).is_some(),
        h1_like_count: extract_h1s(&document).len(),
        heading_count: heading_count(&document),
        text_length: document_text(&document).chars().count(),
    }
}

/// Parses a page and extracts all SEO fields and candidates
///
/// `collect_links` and `collect_images` correspond to the engine's two
/// extraction toggles; disabled sections are skipped entirely.
pub fn extract_page(
    html: &str,
    base_url: &Url,
    collect_links: bool,
    collect_images: bool,
) -> PageExtract {
    let document = Html::parse_document(html);
    let mut extract = PageExtract {
        title: extract_title(&document),
        description: extract_meta_content(&document, "description"),
        canonical: extract_canonical(&document),
        robots: extract_meta_content(&document, "robots"),
        h1s: extract_h1s(&document),
        h2s: extract_h2s(&document),
        ..PageExtract::default()
    };

    extract_hreflangs(&document, base_url, &mut extract);

    let content_text = visible_text(main_container(&document));
    extract.word_count = word_count(&content_text);
    extract.keywords = top_keywords(&content_text, KEYWORD_LIMIT);

    if collect_links {
        extract.links = extract_links(&document, base_url);
    }

    if collect_images {
        extract.images = extract_images(&document, base_url);
    }

    extract
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn extract_meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[name="{}"]"#, name)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_canonical(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"link[rel="canonical"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// H1 texts, falling back to heading-like class/role attributes when the
/// page has no true `<h1>`
fn extract_h1s(document: &Html) -> Vec<String> {
    if let Ok(selector) = Selector::parse("h1") {
        let h1s: Vec<String> = document
            .select(&selector)
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect();
        if !h1s.is_empty() {
            return h1s;
        }
    }

    if let Some(fallback) = first_by_class_hint(document, H1_CLASS_HINTS) {
        let text = element_text(fallback);
        if !text.is_empty() {
            return vec![text];
        }
    }

    if let Ok(selector) = Selector::parse(r#"[role="heading"]"#) {
        if let Some(role_heading) = document.select(&selector).next() {
            let text = element_text(role_heading);
            if !text.is_empty() {
                return vec![text];
            }
        }
    }

    Vec::new()
}

fn extract_h2s(document: &Html) -> Vec<String> {
    if let Ok(selector) = Selector::parse("h2") {
        let h2s: Vec<String> = document
            .select(&selector)
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect();
        if !h2s.is_empty() {
            return h2s;
        }
    }

    all_by_class_hint(document, H2_CLASS_HINTS)
        .into_iter()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn extract_hreflangs(document: &Html, base_url: &Url, extract: &mut PageExtract) {
    let Ok(selector) = Selector::parse(r#"link[rel="alternate"][hreflang]"#) else {
        return;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(target) = base_url.join(href.trim()) else {
            continue;
        };
        let target = target.to_string();

        let lang = element
            .value()
            .attr("hreflang")
            .unwrap_or("")
            .to_lowercase();

        if lang == "es" || lang.starts_with("es-") {
            extract.hreflang_es.get_or_insert(target.clone());
        } else if lang == "en" || lang.starts_with("en-") {
            extract.hreflang_en.get_or_insert(target.clone());
        } else if lang == "pt" || lang.starts_with("pt-") {
            extract.hreflang_pt.get_or_insert(target.clone());
        }

        extract.alternates.push(target);
    }
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<LinkCandidate> {
    let mut links = Vec::new();
    let Ok(selector) = Selector::parse("a[href], area[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(target) = resolve_href(href, base_url) else {
            continue;
        };

        links.push(LinkCandidate {
            anchor_text: element_text(element),
            scope: classify_scope(base_url, &target),
            hreflang: element
                .value()
                .attr("hreflang")
                .map(|l| l.trim().to_string()),
            url: target.to_string(),
        });
    }

    links
}

fn extract_images(document: &Html, base_url: &Url) -> Vec<ImageCandidate> {
    let mut images = Vec::new();
    let source_page = base_url.to_string();

    // Favicon first, when advertised
    if let Ok(selector) = Selector::parse(r#"link[rel~="icon"]"#) {
        if let Some(favicon) = document.select(&selector).next() {
            if let Some(href) = favicon.value().attr("href") {
                if let Ok(url) = base_url.join(href.trim()) {
                    images.push(ImageCandidate {
                        source_page: source_page.clone(),
                        url: url.to_string(),
                        title: "Favicon".to_string(),
                        alt: "Favicon".to_string(),
                    });
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("img") {
        for img in document.select(&selector) {
            let src = img
                .value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
                .or_else(|| img.value().attr("data-lazy-src"));
            let Some(src) = src else {
                continue;
            };
            let Ok(url) = base_url.join(src.trim()) else {
                continue;
            };
            images.push(ImageCandidate {
                source_page: source_page.clone(),
                url: url.to_string(),
                title: img.value().attr("title").unwrap_or("").to_string(),
                alt: img.value().attr("alt").unwrap_or("").to_string(),
            });
        }
    }

    // Responsive sources contribute the URL part of each srcset entry
    if let Ok(selector) = Selector::parse("source[srcset], picture[srcset]") {
        for source in document.select(&selector) {
            let Some(srcset) = source.value().attr("srcset") else {
                continue;
            };
            for entry in srcset.split(',') {
                let Some(src) = entry.trim().split_whitespace().next() else {
                    continue;
                };
                let Ok(url) = base_url.join(src) else {
                    continue;
                };
                images.push(ImageCandidate {
                    source_page: source_page.clone(),
                    url: url.to_string(),
                    title: String::new(),
                    alt: String::new(),
                });
            }
        }
    }

    images
}

/// First element whose class list contains any of the given fragments
fn first_by_class_hint<'a>(document: &'a Html, hints: &[&str]) -> Option<ElementRef<'a>> {
    let selector = Selector::parse("[class]").ok()?;
    document
        .select(&selector)
        .find(|el| class_matches(el, hints))
}

/// All elements whose class list contains any of the given fragments
fn all_by_class_hint<'a>(document: &'a Html, hints: &[&str]) -> Vec<ElementRef<'a>> {
    match Selector::parse("[class]") {
        Ok(selector) => document
            .select(&selector)
            .filter(|el| class_matches(el, hints))
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn class_matches(element: &ElementRef<'_>, hints: &[&str]) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_lowercase();
        hints.iter().any(|hint| class.contains(hint))
    })
}

/// Resolves an href against the page URL, skipping non-navigable targets
fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let resolved = base_url.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    Some(resolved)
}

fn element_text(element: ElementRef<'_>) -> String {
    visible_text(element)
}
