//! Report generation boundary
//!
//! Pure functions of the accumulated record collections. The export format
//! is CSV, one file per sheet; swapping it for another tabular format
//! touches nothing in the engine.

mod issues;
mod report;

pub use issues::{derive_issues, SeoIssue, Severity};
pub use report::{
    format_images, format_issues, format_links, format_pages, format_summary, write_report,
    ReportMeta,
};

use thiserror::Error;

/// Report-writing errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for report operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;
