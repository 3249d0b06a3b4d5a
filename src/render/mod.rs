//! Browser-rendered fetching
//!
//! A bounded pool of reusable headless-browser pages for pages that plain
//! HTTP cannot capture (client-rendered applications, challenge
//! interstitials). Compiled behind the `browser` feature; without it the
//! pool fails to launch and the crawl falls back to plain content.

mod pool;

pub use pool::RenderPool;

use thiserror::Error;

/// Rendering failures; none of these abort a crawl
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("no render slot became free within the wait budget")]
    Busy,

    #[error("render pool is closed")]
    Closed,

    #[error("could not open a browser page: {0}")]
    Page(String),

    #[error("navigation failed for {0}")]
    Navigation(String),

    #[error("content capture failed: {0}")]
    Capture(String),

    #[error("browser support not compiled in (enable the `browser` feature)")]
    Unavailable,
}

/// Status code reported for a successful render
///
/// The devtools protocol does not reliably surface the main document's HTTP
/// status, so a render that produced content reports plain success; a
/// failed render surfaces as a [`RenderError`] instead.
pub const RENDER_OK_STATUS: u16 = 200;
