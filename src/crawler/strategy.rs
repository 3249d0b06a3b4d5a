//! Fetch strategy selection
//!
//! Given the plain-HTTP response for a page, decide whether the content is
//! usable as-is or the page must be re-fetched through the rendering
//! engine. The checks run in a fixed order; each later check assumes the
//! earlier ones passed.

use crate::config::RenderHeuristics;
use crate::extract::structural_summary;

/// Body fragments typical of anti-bot challenge interstitials
const CHALLENGE_PHRASES: &[&str] = &[
    "just a moment",
    "checking your browser",
    "attention required",
    "verifying you are human",
    "enable javascript and cookies",
];

/// The selector's verdict for one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// The plain-HTTP body is good enough for extraction
    UsePlain,
    /// The page must be fetched again through the rendering engine
    Render,
}

impl FetchStrategy {
    pub fn needs_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Decides whether a plain response needs a rendered re-fetch
///
/// Order matters:
/// 1. Challenge pages (403 or known phrases) always render.
/// 2. Skeleton HTML (structurally large but textually empty, or headingless
///    with almost no text) renders.
/// 3. A structural parse must yield a title, a top-level heading, and a
///    minimum amount of text; otherwise render.
/// 4. Anything else uses the plain body.
///
/// The decision is deterministic for a fixed input.
pub fn choose_strategy(
    status: u16,
    content_type: &str,
    body: &str,
    heuristics: &RenderHeuristics,
) -> FetchStrategy {
    // (a) Anti-bot challenge
    if status == 403 || contains_challenge_phrase(body) {
        return FetchStrategy::Render;
    }

    // Non-HTML bodies have nothing to parse; let the renderer take over
    let lower_type = content_type.to_lowercase();
    if !lower_type.is_empty() && !lower_type.contains("text/html") {
        return FetchStrategy::Render;
    }

    let summary = structural_summary(body);

    // (b) Skeleton HTML: large but textually empty, typical of
    // client-rendered applications before script execution
    if body.len() > heuristics.skeleton_html_bytes
        && summary.text_length < heuristics.min_text_chars
    {
        return FetchStrategy::Render;
    }
    if summary.heading_count == 0 && summary.text_length < heuristics.sparse_text_chars {
        return FetchStrategy::Render;
    }

    // (c) Weak extraction: the parse must produce a title, a top-level
    // heading, and enough text to analyze
    if !summary.has_title
        || summary.h1_like_count == 0
        || summary.text_length < heuristics.min_extract_chars
    {
        return FetchStrategy::Render;
    }

    // (d) The plain body is usable
    FetchStrategy::UsePlain
}

fn contains_challenge_phrase(body: &str) -> bool {
    let lower = body.to_lowercase();
    CHALLENGE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
