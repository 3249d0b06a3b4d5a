//! Crawl engine: frontier draining, fetch orchestration, and the
//! run/pause/stop/resume state machine
//!
//! The loop itself is strictly sequential: one URL is fully processed,
//! including its link and image verification fan-out, before the next is
//! popped. Concurrency lives inside a page, through the bounded verifier
//! workers and the shared render pool.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{build_http_client, fetch_page, PlainResponse};
use crate::crawler::frontier::Frontier;
use crate::crawler::strategy::choose_strategy;
use crate::extract::{extract_page, PageExtract};
use crate::render::{RenderError, RenderPool};
use crate::state::{CrawlPhase, CrawlSnapshot};
use crate::store::{ImageRecord, LinkRecord, PageRecord, PageStatus, ResultStore, StoreSnapshot};
use crate::url::{admit, normalize_url, registrable_domain, Admission, CrawlScope};
use crate::verify::{LinkStatus, LinkVerifier};
use crate::{SondeoError, UrlError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

/// Granularity of the interruptible inter-request sleep; a stop request is
/// observed within one tick
const DELAY_TICK_MS: u64 = 100;

/// Structured progress counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounts {
    /// URLs fully processed so far
    pub completed: usize,
    /// Page ceiling; `None` means unbounded
    pub total: Option<usize>,
    /// URLs waiting in the frontier
    pub pending: usize,
}

/// Tagged progress payload: a human-readable message plus optional counters
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub message: String,
    pub counts: Option<ProgressCounts>,
}

/// Invoked from the crawl's own task after every processed URL; the UI is
/// responsible for marshaling to its own thread
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Invoked once when a crawl reaches `Completed`
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// Shared control block between the engine and external handles
#[derive(Debug)]
struct CrawlControl {
    stop_requested: AtomicBool,
    phase: Mutex<CrawlPhase>,
}

impl CrawlControl {
    fn new() -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            phase: Mutex::new(CrawlPhase::Stopped),
        }
    }

    fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    fn clear_stop(&self) {
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn phase(&self) -> CrawlPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: CrawlPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }
}

/// Cloneable handle for requesting a stop from outside the crawl task
#[derive(Clone)]
pub struct CrawlHandle {
    control: Arc<CrawlControl>,
}

impl CrawlHandle {
    /// Requests a stop; the running loop honors it within one delay tick
    pub fn stop(&self) {
        self.control.request_stop();
    }

    pub fn phase(&self) -> CrawlPhase {
        self.control.phase()
    }
}

/// Three-stage fetch result threaded through the crawl loop
#[derive(Debug)]
enum FetchOutcome {
    /// The plain-HTTP body was good enough
    Fetched(PlainResponse),
    /// The page was re-fetched through the rendering engine
    Rendered { content: String, status: u16 },
    /// Neither fetch path produced content
    Failed { status: PageStatus, reason: String },
}

/// Lazily-launched render pool shared across the whole crawl
struct RenderState {
    pool: Option<Arc<RenderPool>>,
    unavailable: bool,
}

/// The crawl engine
///
/// Construct with a validated [`CrawlConfig`], then `run`. `stop` requests a
/// pause that captures a resumable snapshot; `resume` restores it. Record
/// collections are readable at any time through the accessors.
pub struct Crawler {
    config: CrawlConfig,
    frontier: Frontier,
    store: Arc<ResultStore>,
    verifier: Arc<LinkVerifier>,
    render: RenderState,
    control: Arc<CrawlControl>,
    snapshot: Option<CrawlSnapshot>,
    scope: CrawlScope,
    start_time: Option<Instant>,
}

impl Crawler {
    /// Creates an engine for the given configuration
    ///
    /// Fails fast on invalid configuration (malformed seed URL, empty URL
    /// list, out-of-range tuning values).
    pub fn new(config: CrawlConfig) -> Result<Self, SondeoError> {
        crate::config::validate(&config)?;

        let client = build_http_client(&config.user_agent)?;

        let (scope, seeds) = match &config.specific_urls {
            Some(urls) => {
                let mut normalized = Vec::with_capacity(urls.len());
                for url in urls {
                    normalized.push(normalize_url(url)?.to_string());
                }
                let set: HashSet<String> = normalized.iter().cloned().collect();
                (CrawlScope::UrlSet(set), normalized)
            }
            None => {
                let seed = normalize_url(&config.base_url)?;
                let domain = registrable_domain(&seed).ok_or(UrlError::MissingDomain)?;
                (CrawlScope::Domain(domain), vec![seed.to_string()])
            }
        };

        let verifier = Arc::new(LinkVerifier::new(client, config.verifier.clone()));

        Ok(Self {
            config,
            frontier: Frontier::with_seeds(seeds),
            store: Arc::new(ResultStore::new()),
            verifier,
            render: RenderState {
                pool: None,
                unavailable: false,
            },
            control: Arc::new(CrawlControl::new()),
            snapshot: None,
            scope,
            start_time: None,
        })
    }

    /// A handle for stopping the crawl from another task or thread
    pub fn handle(&self) -> CrawlHandle {
        CrawlHandle {
            control: Arc::clone(&self.control),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.control.phase()
    }

    /// Copy of all accumulated records
    pub fn results(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    pub fn visited_count(&self) -> usize {
        self.frontier.visited_len()
    }

    pub fn pending_count(&self) -> usize {
        self.frontier.pending_len()
    }

    /// Runs the crawl loop until the frontier drains, the page ceiling is
    /// reached, or a stop request is honored
    pub async fn run(
        &mut self,
        progress: Option<ProgressCallback>,
        completion: Option<CompletionCallback>,
    ) -> Result<(), SondeoError> {
        let phase = self.control.phase();
        if phase.is_running() || phase.is_terminal() {
            return Err(SondeoError::InvalidTransition {
                from: phase,
                to: CrawlPhase::Running,
            });
        }
        self.control.set_phase(CrawlPhase::Running);
        self.control.clear_stop();

        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }

        self.report(
            progress.as_ref(),
            format!(
                "Iniciando análisis de: {} (delay {}ms)",
                self.config.base_url, self.config.delay_ms
            ),
        );

        let mut paused = false;

        loop {
            if self.control.is_stop_requested() {
                self.pause();
                paused = true;
                break;
            }

            if let Some(ceiling) = self.config.page_ceiling() {
                if self.frontier.visited_len() >= ceiling {
                    self.report(
                        progress.as_ref(),
                        format!("Alcanzado límite de {} páginas", ceiling),
                    );
                    break;
                }
            }

            let Some(url) = self.frontier.pop() else {
                break;
            };

            if self.frontier.is_visited(&url) {
                continue;
            }
            self.frontier.mark_visited(&url);

            self.process_page(&url, progress.as_ref()).await;
            self.report_progress(progress.as_ref());

            if self.sleep_interruptibly().await {
                self.pause();
                paused = true;
                break;
            }
        }

        if paused {
            return Ok(());
        }

        self.control.set_phase(CrawlPhase::Completed);
        self.report(
            progress.as_ref(),
            format!(
                "Análisis completado: {} páginas en {}, {} con error",
                self.frontier.visited_len(),
                format_elapsed(self.elapsed()),
                self.store.error_page_count()
            ),
        );

        if let Some(completion) = completion {
            completion();
        }

        Ok(())
    }

    /// Requests a stop
    ///
    /// While running, the loop observes the request within one delay tick,
    /// captures a snapshot, and parks in `Paused`. Called again while
    /// parked, the engine becomes `Stopped` (still resumable).
    pub fn stop(&mut self) {
        self.control.request_stop();
        if self.control.phase() == CrawlPhase::Paused {
            self.control.set_phase(CrawlPhase::Stopped);
        }
    }

    /// Restores the snapshot captured by the last honored stop request
    ///
    /// Refused when nothing remains to crawl; the crawl is then reported
    /// complete instead. After a successful resume, call `run` again to
    /// continue.
    pub fn resume(&mut self) -> Result<(), SondeoError> {
        let phase = self.control.phase();
        if !phase.is_resumable() {
            return Err(SondeoError::InvalidTransition {
                from: phase,
                to: CrawlPhase::Running,
            });
        }

        let Some(snapshot) = self.snapshot.take() else {
            return Err(SondeoError::ResumeRefused(
                "no snapshot held from a previous stop".to_string(),
            ));
        };

        if snapshot.is_exhausted() {
            self.control.set_phase(CrawlPhase::Completed);
            return Err(SondeoError::ResumeRefused(
                "frontier is empty; the crawl is complete".to_string(),
            ));
        }

        self.frontier = Frontier::restore(snapshot.visited, snapshot.pending);
        self.store.restore(snapshot.store);
        self.config.analyze_images = snapshot.analyze_images;
        self.config.analyze_links = snapshot.analyze_links;
        self.control.clear_stop();

        tracing::info!(
            "Crawl resumed with {} URLs pending, {} visited",
            self.frontier.pending_len(),
            self.frontier.visited_len()
        );

        Ok(())
    }

    /// Captures a full-page screenshot through the render pool
    pub async fn capture_screenshot(
        &mut self,
        url: &str,
        output: Option<&Path>,
    ) -> Result<Option<Vec<u8>>, SondeoError> {
        let normalized = normalize_url(url)?;
        self.ensure_render_pool().await?;
        match &self.render.pool {
            Some(pool) => Ok(pool.screenshot(normalized.as_str(), output).await?),
            None => Err(RenderError::Unavailable.into()),
        }
    }

    /// Captures the crawl state and parks the engine
    fn pause(&mut self) {
        let (visited, pending) = self.frontier.snapshot();
        let pending_count = pending.len();
        self.snapshot = Some(CrawlSnapshot {
            visited,
            pending,
            store: self.store.snapshot(),
            analyze_images: self.config.analyze_images,
            analyze_links: self.config.analyze_links,
        });
        self.control.set_phase(CrawlPhase::Paused);
        tracing::info!("Crawl paused with {} URLs pending", pending_count);
    }

    /// Fully processes one URL, appending exactly one PageRecord
    async fn process_page(&mut self, url: &str, progress: Option<&ProgressCallback>) {
        self.report(progress, format!("Analizando: {}", url));

        let outcome = self.fetch_with_strategy(url, progress).await;

        let (content, status) = match outcome {
            FetchOutcome::Failed { status, reason } => {
                tracing::warn!("Fetch failed for {}: {}", url, reason);
                self.store.append_page(PageRecord::error_stub(url, status));
                return;
            }
            FetchOutcome::Fetched(plain) => (plain.body, plain.status),
            FetchOutcome::Rendered { content, status } => (content, status),
        };

        // Redirect-landed content is analyzed like a success; anything else
        // is recorded as-is
        if content.is_empty() || !(200..400).contains(&status) {
            self.store
                .append_page(PageRecord::error_stub(url, PageStatus::Code(status)));
            return;
        }

        let Ok(base) = Url::parse(url) else {
            self.store
                .append_page(PageRecord::error_stub(url, PageStatus::Error));
            return;
        };

        let extract = extract_page(
            &content,
            &base,
            self.config.analyze_links,
            self.config.analyze_images,
        );

        self.store.record_duplicates(
            url,
            extract.title.as_deref(),
            &extract.h1s,
            extract.description.as_deref(),
        );

        let mut anchors = Vec::new();
        if self.config.analyze_links {
            anchors = self.process_links(url, &base, &extract).await;
        }

        if self.config.analyze_images && !extract.images.is_empty() {
            let records = self.verifier.verify_images(extract.images.clone()).await;
            self.store.append_images(records);
        }

        for alternate in &extract.alternates {
            self.try_enqueue(alternate).await;
        }

        self.store
            .append_page(build_page_record(url, status, &extract, &anchors));
    }

    /// Verifies a page's outbound links, records them, and feeds admissible
    /// internal targets back into the frontier; returns the anchor texts
    async fn process_links(
        &mut self,
        page_url: &str,
        base: &Url,
        extract: &PageExtract,
    ) -> Vec<String> {
        if extract.links.is_empty() {
            return Vec::new();
        }

        let source_domain = registrable_domain(base).unwrap_or_default();

        let mut seen = HashSet::new();
        let unique_targets: Vec<String> = extract
            .links
            .iter()
            .filter(|link| seen.insert(link.url.clone()))
            .map(|link| link.url.clone())
            .collect();

        let statuses = self.verifier.check_many(unique_targets).await;

        let mut anchors: Vec<String> = Vec::new();
        let mut records = Vec::with_capacity(extract.links.len());

        for link in &extract.links {
            let status = statuses
                .get(&link.url)
                .copied()
                .unwrap_or(LinkStatus::ConnectionError);

            let target_domain = Url::parse(&link.url)
                .ok()
                .and_then(|u| registrable_domain(&u))
                .unwrap_or_default();

            records.push(LinkRecord {
                source_page: page_url.to_string(),
                source_domain: source_domain.clone(),
                target_url: link.url.clone(),
                target_domain,
                scope: link.scope,
                anchor_text: link.anchor_text.clone(),
                status,
            });

            if !link.anchor_text.is_empty() && !anchors.contains(&link.anchor_text) {
                anchors.push(link.anchor_text.clone());
            }

            if link.scope.is_internal() || link.hreflang.is_some() {
                self.try_enqueue(&link.url).await;
            }
        }

        self.store.append_links(records);
        anchors
    }

    /// Normalizes, admits, and status-gates a discovered URL
    ///
    /// A cached status below 400 enqueues without a fresh network check; a
    /// cached status at 400 or above never re-enqueues. Uncached URLs get
    /// one liveness check (which itself honors the circuit breaker).
    async fn try_enqueue(&mut self, raw: &str) -> bool {
        let Ok(normalized) = normalize_url(raw) else {
            return false;
        };
        let url_string = normalized.to_string();

        if self.frontier.is_visited(&url_string) || self.frontier.is_queued(&url_string) {
            return false;
        }

        let admission = admit(&normalized, &self.scope);
        match admission {
            Admission::Rejected => false,
            Admission::Image => {
                if self.config.analyze_images {
                    self.store.append_image(ImageRecord::unverified(&url_string));
                }
                false
            }
            Admission::Eligible => {
                let status = match self.verifier.cache().get(&url_string) {
                    Some(cached) => cached,
                    None => self.verifier.check_url(&url_string).await,
                };
                if status.is_healthy() {
                    self.frontier.enqueue(url_string)
                } else {
                    tracing::debug!("Not enqueueing {} ({})", url_string, status);
                    false
                }
            }
        }
    }

    /// Plain fetch, strategy decision, optional rendered re-fetch
    async fn fetch_with_strategy(
        &mut self,
        url: &str,
        progress: Option<&ProgressCallback>,
    ) -> FetchOutcome {
        let fetched = fetch_page(self.verifier.client(), url).await;
        match fetched {
            Ok(plain) => {
                let strategy = choose_strategy(
                    plain.status,
                    &plain.content_type,
                    &plain.body,
                    &self.config.heuristics,
                );

                if !strategy.needs_render() {
                    return FetchOutcome::Fetched(plain);
                }

                self.report(progress, format!("Renderizando: {}", url));
                match self.render_page(url).await {
                    Ok((content, status)) => FetchOutcome::Rendered { content, status },
                    Err(e) if !plain.body.is_empty() => {
                        // Fall back to whatever plain HTTP already gave us
                        tracing::warn!("Render failed for {} ({}), using plain content", url, e);
                        FetchOutcome::Fetched(plain)
                    }
                    Err(e) => FetchOutcome::Failed {
                        status: PageStatus::Code(plain.status),
                        reason: e.to_string(),
                    },
                }
            }
            Err(fetch_error) => {
                // Plain HTTP failed outright; rendering is the last resort
                match self.render_page(url).await {
                    Ok((content, status)) => FetchOutcome::Rendered { content, status },
                    Err(render_error) => FetchOutcome::Failed {
                        status: PageStatus::Error,
                        reason: format!("{}; {}", fetch_error, render_error),
                    },
                }
            }
        }
    }

    async fn render_page(&mut self, url: &str) -> Result<(String, u16), RenderError> {
        self.ensure_render_pool_lenient().await?;
        match &self.render.pool {
            Some(pool) => pool.render(url).await,
            None => Err(RenderError::Unavailable),
        }
    }

    /// Launches the render pool on first use; a failed launch marks
    /// rendering unavailable for the rest of the crawl
    async fn ensure_render_pool_lenient(&mut self) -> Result<(), RenderError> {
        if self.render.unavailable {
            return Err(RenderError::Unavailable);
        }
        if self.render.pool.is_none() {
            match RenderPool::launch(&self.config.render, self.config.headless).await {
                Ok(pool) => self.render.pool = Some(Arc::new(pool)),
                Err(e) => {
                    tracing::warn!("Render pool unavailable: {}", e);
                    self.render.unavailable = true;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn ensure_render_pool(&mut self) -> Result<(), SondeoError> {
        self.ensure_render_pool_lenient().await?;
        Ok(())
    }

    /// Sleeps the inter-request delay in small ticks; returns true when a
    /// stop request arrived mid-sleep
    async fn sleep_interruptibly(&self) -> bool {
        let mut remaining = self.config.delay_ms;
        while remaining > 0 {
            if self.control.is_stop_requested() {
                return true;
            }
            let tick = remaining.min(DELAY_TICK_MS);
            tokio::time::sleep(Duration::from_millis(tick)).await;
            remaining -= tick;
        }
        self.control.is_stop_requested()
    }

    fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    fn report(&self, progress: Option<&ProgressCallback>, message: String) {
        if let Some(callback) = progress {
            callback(ProgressUpdate {
                message,
                counts: None,
            });
        }
    }

    fn report_progress(&self, progress: Option<&ProgressCallback>) {
        let Some(callback) = progress else {
            return;
        };
        let completed = self.frontier.visited_len();
        let pending = self.frontier.pending_len();
        let message = format!(
            "Progreso del análisis:\n   - Páginas analizadas: {}\n   - Tiempo transcurrido: {}\n   - URLs pendientes: {}",
            completed,
            format_elapsed(self.elapsed()),
            pending
        );
        callback(ProgressUpdate {
            message,
            counts: Some(ProgressCounts {
                completed,
                total: self.config.page_ceiling(),
                pending,
            }),
        });
    }
}

/// Assembles the final record for a processed page
fn build_page_record(
    url: &str,
    status: u16,
    extract: &PageExtract,
    anchors: &[String],
) -> PageRecord {
    PageRecord {
        url: url.to_string(),
        status: PageStatus::Code(status),
        title_length: extract.title.as_deref().map(str::len).unwrap_or(0),
        title: extract.title.clone(),
        description_length: extract.description.as_deref().map(str::len).unwrap_or(0),
        description: extract.description.clone(),
        h1: join_nonempty(&extract.h1s),
        h1_count: extract.h1s.len(),
        h2: join_nonempty(&extract.h2s),
        keywords: if extract.keywords.is_empty() {
            None
        } else {
            Some(extract.keywords.join(", "))
        },
        canonical: extract.canonical.clone(),
        robots: extract.robots.clone(),
        anchors: join_nonempty(anchors),
        word_count: extract.word_count,
        url_length: url.len(),
        hreflang_es: extract.hreflang_es.clone(),
        hreflang_en: extract.hreflang_en.clone(),
        hreflang_pt: extract.hreflang_pt.clone(),
    }
}

fn join_nonempty(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(" | "))
    }
}

/// Formats a duration as the reports expect ("1h 3m 20s")
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;

    fn test_config(base: &str) -> CrawlConfig {
        let mut config = CrawlConfig::for_site(base);
        config.delay_ms = 10;
        config
    }

    #[test]
    fn test_new_fails_fast_on_malformed_seed() {
        let result = Crawler::new(test_config("not a url"));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_fails_fast_on_non_http_seed() {
        let result = Crawler::new(test_config("ftp://example.com/"));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_starts_stopped_with_seeded_frontier() {
        let crawler = Crawler::new(test_config("https://example.com")).unwrap();
        assert_eq!(crawler.phase(), CrawlPhase::Stopped);
        assert_eq!(crawler.pending_count(), 1);
        assert_eq!(crawler.visited_count(), 0);
    }

    #[test]
    fn test_url_list_mode_seeds_all() {
        let config = CrawlConfig::for_urls(vec![
            "https://example.com/a".to_string(),
            "https://other.com/b".to_string(),
        ]);
        let crawler = Crawler::new(config).unwrap();
        assert_eq!(crawler.pending_count(), 2);
    }

    #[test]
    fn test_resume_without_snapshot_refused() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();
        let result = crawler.resume();
        assert!(matches!(result.unwrap_err(), SondeoError::ResumeRefused(_)));
    }

    #[test]
    fn test_resume_with_exhausted_snapshot_completes() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();
        crawler.snapshot = Some(CrawlSnapshot {
            visited: HashSet::new(),
            pending: Vec::new(),
            store: StoreSnapshot::default(),
            analyze_images: true,
            analyze_links: true,
        });

        let result = crawler.resume();
        assert!(matches!(result.unwrap_err(), SondeoError::ResumeRefused(_)));
        assert_eq!(crawler.phase(), CrawlPhase::Completed);
    }

    #[test]
    fn test_handle_requests_stop() {
        let crawler = Crawler::new(test_config("https://example.com")).unwrap();
        let handle = crawler.handle();
        assert!(!crawler.control.is_stop_requested());
        handle.stop();
        assert!(crawler.control.is_stop_requested());
    }

    #[test]
    fn test_stop_while_paused_becomes_stopped() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();
        crawler.control.set_phase(CrawlPhase::Paused);
        crawler.stop();
        assert_eq!(crawler.phase(), CrawlPhase::Stopped);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0h 0m 0s");
        assert_eq!(format_elapsed(Duration::from_secs(65)), "0h 1m 5s");
        assert_eq!(format_elapsed(Duration::from_secs(3801)), "1h 3m 21s");
    }

    #[test]
    fn test_build_page_record_joins_fields() {
        let extract = PageExtract {
            title: Some("Título".to_string()),
            description: Some("Desc".to_string()),
            h1s: vec!["Uno".to_string(), "Dos".to_string()],
            h2s: vec!["Sec".to_string()],
            keywords: vec!["viajes".to_string(), "playa".to_string()],
            word_count: 42,
            ..PageExtract::default()
        };
        let anchors = vec!["inicio".to_string(), "contacto".to_string()];

        let record = build_page_record("https://example.com/p", 200, &extract, &anchors);
        assert_eq!(record.status, PageStatus::Code(200));
        assert_eq!(record.title_length, "Título".len());
        assert_eq!(record.h1.as_deref(), Some("Uno | Dos"));
        assert_eq!(record.h1_count, 2);
        assert_eq!(record.keywords.as_deref(), Some("viajes, playa"));
        assert_eq!(record.anchors.as_deref(), Some("inicio | contacto"));
        assert_eq!(record.word_count, 42);
        assert_eq!(record.url_length, "https://example.com/p".len());
    }

    #[test]
    fn test_build_page_record_empty_fields_are_none() {
        let record =
            build_page_record("https://example.com/p", 200, &PageExtract::default(), &[]);
        assert!(record.h1.is_none());
        assert!(record.h2.is_none());
        assert!(record.keywords.is_none());
        assert!(record.anchors.is_none());
    }

    #[tokio::test]
    async fn test_try_enqueue_rejects_cached_bad_status() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();
        crawler
            .verifier
            .cache()
            .put("https://example.com/broken", LinkStatus::NotFound);

        assert!(!crawler.try_enqueue("https://example.com/broken").await);
        assert_eq!(crawler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_try_enqueue_accepts_cached_good_status() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();
        crawler
            .verifier
            .cache()
            .put("https://example.com/fine", LinkStatus::Ok);

        assert!(crawler.try_enqueue("https://example.com/fine").await);
        assert_eq!(crawler.pending_count(), 2);
    }

    #[tokio::test]
    async fn test_try_enqueue_records_direct_image() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();

        assert!(!crawler.try_enqueue("https://example.com/logo.png").await);
        assert_eq!(crawler.store.image_count(), 1);
        let snapshot = crawler.results();
        assert_eq!(snapshot.images[0].state, crate::store::ImageState::NoVerificado);
    }

    #[tokio::test]
    async fn test_try_enqueue_rejects_out_of_scope_without_check() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();
        assert!(!crawler.try_enqueue("https://other.com/page").await);
        // No status was cached because no check was made
        assert!(crawler.verifier.cache().is_empty());
    }

    #[tokio::test]
    async fn test_try_enqueue_duplicate_rejected() {
        let mut crawler = Crawler::new(test_config("https://example.com")).unwrap();
        crawler
            .verifier
            .cache()
            .put("https://example.com/fine", LinkStatus::Ok);

        assert!(crawler.try_enqueue("https://example.com/fine").await);
        assert!(!crawler.try_enqueue("https://example.com/fine").await);
        // Fragment-stripped variant is the same URL after normalization
        assert!(!crawler.try_enqueue("https://example.com/fine#top").await);
    }
}
