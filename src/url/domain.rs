use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sondeo::url::extract_domain;
///
/// let url = Url::parse("https://www.example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the registrable domain used for internal/external comparison
///
/// This is the lowercase host with a single leading `www.` stripped, so
/// `www.example.com` and `example.com` compare as the same site.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sondeo::url::registrable_domain;
///
/// let url = Url::parse("https://www.example.com/path").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    extract_domain(url).map(|h| strip_www(&h))
}

/// Strips a single leading `www.` from an already-lowercase host
pub fn strip_www(host: &str) -> String {
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
