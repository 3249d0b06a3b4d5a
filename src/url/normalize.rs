use crate::UrlError;
use url::Url;

/// Normalizes a URL before any frontier membership test
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL; reject if malformed
/// 3. Reject non-HTTP(S) schemes
/// 4. Remove the fragment (everything after #)
///
/// Normalization is deliberately light: query strings, path casing, and the
/// `www.` prefix are preserved so the crawled URL matches what the site
/// actually serves. Domain comparison strips `www.` separately (see
/// [`registrable_domain`](crate::url::registrable_domain)).
///
/// # Examples
///
/// ```
/// use sondeo::url::normalize_url;
///
/// let url = normalize_url("  https://example.com/page#section ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();

    let mut url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}
