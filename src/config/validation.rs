use crate::config::types::CrawlConfig;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Invalid configuration is a programmer error and fails fast at
/// construction time; nothing here is recoverable mid-crawl.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_targets(config)?;
    validate_timing(config)?;
    validate_workers(config)?;
    Ok(())
}

/// Validates the seed URL or explicit URL list
fn validate_targets(config: &CrawlConfig) -> Result<(), ConfigError> {
    match &config.specific_urls {
        Some(urls) => {
            if urls.is_empty() {
                return Err(ConfigError::Validation(
                    "specific-urls cannot be an empty list".to_string(),
                ));
            }
            for url in urls {
                validate_http_url(url)?;
            }
        }
        None => {
            if config.base_url.is_empty() {
                return Err(ConfigError::Validation(
                    "either base-url or specific-urls must be provided".to_string(),
                ));
            }
            validate_http_url(&config.base_url)?;
        }
    }
    Ok(())
}

/// Validates that a URL parses and uses an HTTP(S) scheme
fn validate_http_url(url: &str) -> Result<(), ConfigError> {
    let parsed =
        Url::parse(url.trim()).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: only HTTP and HTTPS URLs can be crawled",
            url
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("{}: missing host", url)));
    }

    Ok(())
}

/// Validates delays and timeouts
fn validate_timing(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.delay_ms > 600_000 {
        return Err(ConfigError::Validation(format!(
            "delay-ms must be <= 600000 (10 minutes), got {}",
            config.delay_ms
        )));
    }

    if config.verifier.check_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "check-timeout-ms must be >= 100ms, got {}",
            config.verifier.check_timeout_ms
        )));
    }

    if config.render.nav_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "nav-timeout-ms must be >= 1000ms, got {}",
            config.render.nav_timeout_ms
        )));
    }

    Ok(())
}

/// Validates worker and pool counts
fn validate_workers(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.verifier.link_workers < 1 || config.verifier.link_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "link-workers must be between 1 and 64, got {}",
            config.verifier.link_workers
        )));
    }

    if config.verifier.image_workers < 1 || config.verifier.image_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "image-workers must be between 1 and 64, got {}",
            config.verifier.image_workers
        )));
    }

    if config.render.pool_size < 1 || config.render.pool_size > 32 {
        return Err(ConfigError::Validation(format!(
            "pool-size must be between 1 and 32, got {}",
            config.render.pool_size
        )));
    }

    if config.verifier.circuit_threshold < 1 {
        return Err(ConfigError::Validation(
            "circuit-threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}
