//! Link and image verification
//!
//! Liveness checks run many at a time under a bounded worker count. Every
//! check consults the URL-status cache first, then the target domain's
//! circuit breaker, and only then touches the network with a HEAD request
//! (falling back to GET when HEAD is rejected). Failures feed the circuit
//! breaker so that repeatedly failing domains stop consuming network calls.

mod cache;
mod circuit;
mod status;

pub use cache::StatusCache;
pub use circuit::CircuitBreaker;
pub use status::LinkStatus;

use crate::config::VerifierConfig;
use crate::extract::ImageCandidate;
use crate::store::{ImageRecord, ImageState};
use crate::url::registrable_domain;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Image extensions recognized when a response carries no usable
/// content-type
const KNOWN_IMAGE_TYPES: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "avif", "ico"];

/// Checks link and image targets with caching and per-domain circuit
/// breaking
pub struct LinkVerifier {
    client: Client,
    cache: Arc<StatusCache>,
    circuit: Arc<CircuitBreaker>,
    config: VerifierConfig,
}

impl LinkVerifier {
    pub fn new(client: Client, config: VerifierConfig) -> Self {
        let circuit = Arc::new(CircuitBreaker::new(
            config.circuit_threshold,
            Duration::from_millis(config.circuit_cooldown_ms),
        ));
        Self {
            client,
            cache: Arc::new(StatusCache::new()),
            circuit,
            config,
        }
    }

    /// The HTTP client shared with the page fetcher
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The shared URL-status cache (also read by frontier admission)
    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// The shared circuit-state table (also read by frontier admission)
    pub fn circuit(&self) -> &Arc<CircuitBreaker> {
        &self.circuit
    }

    /// Checks a single URL, consulting the cache and circuit breaker first
    pub async fn check_url(&self, url: &str) -> LinkStatus {
        if let Some(cached) = self.cache.get(url) {
            tracing::trace!("Cache hit for {}: {}", url, cached);
            return cached;
        }

        let domain = Url::parse(url)
            .ok()
            .and_then(|u| registrable_domain(&u));

        if let Some(domain) = &domain {
            if self.circuit.is_open(domain) {
                tracing::debug!("Circuit open for {}, skipping check of {}", domain, url);
                return LinkStatus::CircuitOpen;
            }
        }

        let status = self.probe(url).await;
        self.cache.put(url, status);

        if let Some(domain) = &domain {
            if status.is_healthy() {
                self.circuit.record_success(domain);
            } else {
                self.circuit.record_failure(domain);
            }
        }

        status
    }

    /// Checks many URLs concurrently under the configured link-worker bound
    pub async fn check_many(&self, urls: Vec<String>) -> HashMap<String, LinkStatus> {
        let semaphore = Arc::new(Semaphore::new(self.config.link_workers));

        let tasks = urls.into_iter().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await;
                let status = self.check_url(&url).await;
                (url, status)
            }
        });

        futures::future::join_all(tasks).await.into_iter().collect()
    }

    /// Verifies image candidates concurrently under the image-worker bound
    pub async fn verify_images(&self, candidates: Vec<ImageCandidate>) -> Vec<ImageRecord> {
        let semaphore = Arc::new(Semaphore::new(self.config.image_workers));

        let tasks = candidates.into_iter().map(|candidate| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await;
                self.verify_image(candidate).await
            }
        });

        futures::future::join_all(tasks).await
    }

    /// Resolves an image candidate's state, type, and size with one HEAD
    /// request
    pub async fn verify_image(&self, candidate: ImageCandidate) -> ImageRecord {
        let timeout = Duration::from_millis(self.config.check_timeout_ms);
        let mut image_type = type_from_extension(&candidate.url);
        let mut size = "0 KB".to_string();
        let mut state = ImageState::NoFuncional;

        match self.client.head(&candidate.url).timeout(timeout).send().await {
            Ok(response) => {
                if response.status().as_u16() == 200 {
                    state = ImageState::Funcional;

                    let content_type = response
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("");
                    if let Some(from_header) = type_from_content_type(content_type) {
                        image_type = from_header;
                    }

                    if let Some(length) = response
                        .headers()
                        .get("content-length")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                    {
                        size = format_size(length);
                    }
                }
            }
            Err(e) => {
                tracing::debug!("Image check failed for {}: {}", candidate.url, e);
            }
        }

        ImageRecord {
            source_page: candidate.source_page,
            image_url: candidate.url,
            title: candidate.title,
            alt: candidate.alt,
            image_type,
            size,
            state,
        }
    }

    /// Issues the actual existence check: HEAD, then GET on 405, with
    /// retries and increasing backoff on transport failure
    async fn probe(&self, url: &str) -> LinkStatus {
        let timeout = Duration::from_millis(self.config.check_timeout_ms);
        let mut attempt: u32 = 0;

        loop {
            match self.client.head(url).timeout(timeout).send().await {
                Ok(response) => {
                    let code = response.status().as_u16();
                    if code == 405 {
                        // HEAD not allowed; this server wants a real GET
                        return match self.client.get(url).timeout(timeout).send().await {
                            Ok(response) => LinkStatus::from_code(response.status().as_u16()),
                            Err(e) => classify_transport_error(&e),
                        };
                    }
                    return LinkStatus::from_code(code);
                }
                Err(e) => {
                    let status = classify_transport_error(&e);
                    // Certificate problems are not transient
                    if status == LinkStatus::SslError || attempt >= self.config.max_retries {
                        return status;
                    }
                    attempt += 1;
                    let backoff =
                        Duration::from_millis(self.config.retry_backoff_ms * u64::from(attempt));
                    tracing::debug!(
                        "Check attempt {} failed for {} ({}), retrying in {:?}",
                        attempt,
                        url,
                        status,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Maps a reqwest transport error onto a link status
fn classify_transport_error(error: &reqwest::Error) -> LinkStatus {
    if error.is_timeout() {
        return LinkStatus::Timeout;
    }
    if is_tls_error(error) {
        return LinkStatus::SslError;
    }
    LinkStatus::ConnectionError
}

/// Walks the error source chain looking for TLS/certificate failures;
/// reqwest does not expose these as a dedicated predicate
fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        let text = err.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        source = err.source();
    }
    false
}

/// Infers an image type from a content-type header ("image/png" -> "PNG")
fn type_from_content_type(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    if !lower.contains("image/") {
        return None;
    }
    lower
        .split('/')
        .nth(1)
        .map(|sub| sub.split(';').next().unwrap_or(sub).trim().to_uppercase())
}

/// Infers an image type from a URL's file extension
fn type_from_extension(url: &str) -> String {
    let lower = url.to_lowercase();
    let ext = lower
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .unwrap_or("");

    if KNOWN_IMAGE_TYPES.contains(&ext) {
        ext.to_uppercase()
    } else {
        "Desconocido".to_string()
    }
}

/// Formats a byte count the way the reports expect ("743 B", "1.2 KB",
/// "3.4 MB")
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_verifier() -> LinkVerifier {
        let config = VerifierConfig {
            check_timeout_ms: 2_000,
            max_retries: 0,
            retry_backoff_ms: 10,
            ..VerifierConfig::default()
        };
        LinkVerifier::new(Client::new(), config)
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(743), "743 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_type_from_content_type() {
        assert_eq!(
            type_from_content_type("image/png"),
            Some("PNG".to_string())
        );
        assert_eq!(
            type_from_content_type("image/jpeg; charset=binary"),
            Some("JPEG".to_string())
        );
        assert_eq!(type_from_content_type("text/html"), None);
        assert_eq!(type_from_content_type(""), None);
    }

    #[test]
    fn test_type_from_extension() {
        assert_eq!(type_from_extension("https://example.com/a.png"), "PNG");
        assert_eq!(type_from_extension("https://example.com/b.JPEG"), "JPEG");
        assert_eq!(type_from_extension("https://example.com/page"), "Desconocido");
        assert_eq!(type_from_extension("https://example.com/x.bin"), "Desconocido");
    }

    #[tokio::test]
    async fn test_check_url_ok() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let status = verifier.check_url(&format!("{}/ok", server.uri())).await;
        assert_eq!(status, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn test_check_url_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let status = verifier
            .check_url(&format!("{}/missing", server.uri()))
            .await;
        assert_eq!(status, LinkStatus::NotFound);
    }

    #[tokio::test]
    async fn test_head_falls_back_to_get_on_405() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let status = verifier.check_url(&format!("{}/page", server.uri())).await;
        assert_eq!(status, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn test_second_check_hits_cache() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/cached"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let url = format!("{}/cached", server.uri());

        assert_eq!(verifier.check_url(&url).await, LinkStatus::Ok);
        // Served from the cache; the mock's expect(1) verifies no second hit
        assert_eq!(verifier.check_url(&url).await, LinkStatus::Ok);
    }

    #[tokio::test]
    async fn test_open_circuit_short_circuits_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let url = format!("{}/page", server.uri());
        let domain = registrable_domain(&Url::parse(&url).unwrap()).unwrap();

        for _ in 0..3 {
            verifier.circuit().record_failure(&domain);
        }

        let status = verifier.check_url(&url).await;
        assert_eq!(status, LinkStatus::CircuitOpen);
        // Synthetic results must not poison the cache
        assert_eq!(verifier.cache().get(&url), None);
    }

    #[tokio::test]
    async fn test_failures_open_circuit_through_checks() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let base = server.uri();
        let domain = registrable_domain(&Url::parse(&base).unwrap()).unwrap();

        for i in 0..3 {
            let status = verifier.check_url(&format!("{}/err{}", base, i)).await;
            assert_eq!(status, LinkStatus::HttpError(500));
        }

        assert!(verifier.circuit().is_open(&domain));
        let status = verifier.check_url(&format!("{}/err99", base)).await;
        assert_eq!(status, LinkStatus::CircuitOpen);
    }

    #[tokio::test]
    async fn test_check_many_returns_all() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let url_a = format!("{}/a", server.uri());
        let url_b = format!("{}/b", server.uri());

        let results = verifier
            .check_many(vec![url_a.clone(), url_b.clone()])
            .await;

        assert_eq!(results.get(&url_a), Some(&LinkStatus::Ok));
        assert_eq!(results.get(&url_b), Some(&LinkStatus::NotFound));
    }

    #[tokio::test]
    async fn test_verify_image_functional() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/logo.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0u8; 2048]),
            )
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let record = verifier
            .verify_image(ImageCandidate {
                source_page: "https://example.com/".to_string(),
                url: format!("{}/logo.png", server.uri()),
                title: "Logo".to_string(),
                alt: "logo".to_string(),
            })
            .await;

        assert_eq!(record.state, ImageState::Funcional);
        assert_eq!(record.image_type, "PNG");
        assert_eq!(record.size, "2.0 KB");
    }

    #[tokio::test]
    async fn test_verify_image_broken() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let verifier = create_test_verifier();
        let record = verifier
            .verify_image(ImageCandidate {
                source_page: "https://example.com/".to_string(),
                url: format!("{}/gone.jpg", server.uri()),
                title: String::new(),
                alt: String::new(),
            })
            .await;

        assert_eq!(record.state, ImageState::NoFuncional);
        // Type falls back to the file extension
        assert_eq!(record.image_type, "JPG");
        assert_eq!(record.size, "0 KB");
    }
}
