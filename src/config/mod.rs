//! Crawl configuration: types, TOML loading, and validation

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    CrawlConfig, RenderHeuristics, RenderPoolConfig, VerifierConfig, DEFAULT_USER_AGENT,
};
pub use validation::validate;
