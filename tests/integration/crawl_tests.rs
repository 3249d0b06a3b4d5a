//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! full crawl cycle end-to-end: fetch, extraction, link/image
//! verification, frontier growth, pause/resume, and report generation.

use sondeo::config::CrawlConfig;
use sondeo::crawler::{CompletionCallback, Crawler, ProgressCallback, ProgressUpdate};
use sondeo::output::{write_report, ReportMeta};
use sondeo::state::CrawlPhase;
use sondeo::store::{ImageState, PageStatus};
use sondeo::url::LinkScope;
use sondeo::verify::LinkStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration for the given seed
fn create_test_config(seed: &str) -> CrawlConfig {
    let mut config = CrawlConfig::for_site(seed);
    config.delay_ms = 10;
    config.verifier.check_timeout_ms = 2_000;
    config.verifier.max_retries = 0;
    config
}

/// A page body that passes the plain-fetch validation (title, heading,
/// enough text) so no render is attempted
fn page_html(title: &str, h1: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<a href="{}">enlace {}</a>"#, href, i))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1><p>{}</p>{}</body></html>",
        title,
        h1,
        "contenido de relleno para superar la validación ".repeat(5),
        anchors
    )
}

/// Mounts a GET mock serving an HTML body
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.into_bytes(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mounts a catch-all HEAD 200 (the verifier's existence checks)
async fn mount_head_ok(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_whole_site_crawl_with_external_link() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_head_ok(&external).await;

    let base = server.uri();
    // Spell the external host differently so it is a different domain
    let external_url = format!("{}/fuera", external.uri().replace("127.0.0.1", "localhost"));

    mount_page(
        &server,
        "/",
        page_html(
            "Inicio",
            "Bienvenida",
            &[
                format!("{}/a", base),
                format!("{}/b", base),
                external_url.clone(),
            ],
        ),
    )
    .await;
    mount_page(&server, "/a", page_html("Página A", "Primera", &[])).await;
    mount_page(&server, "/b", page_html("Página B", "Segunda", &[])).await;

    let config = create_test_config(&format!("{}/", base));
    let mut crawler = Crawler::new(config).unwrap();
    crawler.run(None, None).await.unwrap();

    assert_eq!(crawler.phase(), CrawlPhase::Completed);
    assert_eq!(crawler.visited_count(), 3);
    assert_eq!(crawler.pending_count(), 0);

    let results = crawler.results();
    assert_eq!(results.pages.len(), 3);
    for page in &results.pages {
        assert_eq!(page.status, PageStatus::Code(200));
    }

    let external_links: Vec<_> = results
        .links
        .iter()
        .filter(|l| l.scope == LinkScope::External)
        .collect();
    assert_eq!(external_links.len(), 1);
    assert_eq!(external_links[0].target_url, external_url);
    assert_eq!(external_links[0].target_domain, "localhost");
    // The external target was verified but never crawled
    assert!(!results.pages.iter().any(|p| p.url == external_url));
}

#[tokio::test]
async fn test_duplicate_titles_indexed() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        page_html(
            "Inicio",
            "Portada",
            &[format!("{}/es", base), format!("{}/en", base)],
        ),
    )
    .await;
    // Two distinct pages share an identical title
    mount_page(&server, "/es", page_html("Título Compartido", "Hola", &[])).await;
    mount_page(&server, "/en", page_html("Título Compartido", "Hello", &[])).await;

    let config = create_test_config(&format!("{}/", base));
    let mut crawler = Crawler::new(config).unwrap();
    crawler.run(None, None).await.unwrap();

    let results = crawler.results();
    let urls = results.duplicates.urls_for_title("Título Compartido");
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&format!("{}/es", base)));
    assert!(urls.contains(&format!("{}/en", base)));

    let issues = sondeo::output::derive_issues(&results);
    let duplicate_issues: Vec<_> = issues
        .iter()
        .filter(|i| i.kind == "Meta Título duplicado")
        .collect();
    assert_eq!(duplicate_issues.len(), 2);
}

#[tokio::test]
async fn test_broken_link_recorded_not_crawled() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/rota"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_head_ok(&server).await;

    mount_page(
        &server,
        "/",
        page_html("Inicio", "Portada", &[format!("{}/rota", base)]),
    )
    .await;

    let config = create_test_config(&format!("{}/", base));
    let mut crawler = Crawler::new(config).unwrap();
    crawler.run(None, None).await.unwrap();

    let results = crawler.results();
    // Only the seed was crawled; the dead target never entered the frontier
    assert_eq!(results.pages.len(), 1);
    assert_eq!(results.links.len(), 1);
    assert_eq!(results.links[0].status, LinkStatus::NotFound);
    assert_eq!(results.links[0].status.label(), "No encontrado");
}

#[tokio::test]
async fn test_page_ceiling_stops_crawl() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        page_html(
            "Inicio",
            "Portada",
            &[
                format!("{}/a", base),
                format!("{}/b", base),
                format!("{}/c", base),
            ],
        ),
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&server, route, page_html("Página", "Sección", &[])).await;
    }

    let mut config = create_test_config(&format!("{}/", base));
    config.max_pages = 2;

    let mut crawler = Crawler::new(config).unwrap();
    crawler.run(None, None).await.unwrap();

    assert_eq!(crawler.phase(), CrawlPhase::Completed);
    assert_eq!(crawler.results().pages.len(), 2);
    // Discovered but unprocessed URLs remain pending
    assert!(crawler.pending_count() > 0);
}

#[tokio::test]
async fn test_pause_resume_round_trip() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        page_html(
            "Inicio",
            "Portada",
            &[
                format!("{}/a", base),
                format!("{}/b", base),
                format!("{}/c", base),
            ],
        ),
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&server, route, page_html("Página", "Sección", &[])).await;
    }

    let mut crawler = Crawler::new(create_test_config(&format!("{}/", base))).unwrap();
    let handle = crawler.handle();

    // Stop as soon as the first page has been fully processed
    let processed = Arc::new(AtomicUsize::new(0));
    let processed_cb = Arc::clone(&processed);
    let progress: ProgressCallback = Arc::new(move |update: ProgressUpdate| {
        if let Some(counts) = update.counts {
            processed_cb.store(counts.completed, Ordering::SeqCst);
            if counts.completed >= 1 {
                handle.stop();
            }
        }
    });

    crawler.run(Some(progress), None).await.unwrap();

    assert_eq!(crawler.phase(), CrawlPhase::Paused);
    let visited_at_pause = crawler.visited_count();
    let pending_at_pause = crawler.pending_count();
    assert_eq!(visited_at_pause, 1);
    assert_eq!(pending_at_pause, 3);

    // Resume restores the identical frontier state
    crawler.resume().unwrap();
    assert_eq!(crawler.visited_count(), visited_at_pause);
    assert_eq!(crawler.pending_count(), pending_at_pause);

    // The second run finishes the crawl without re-processing anything
    crawler.run(None, None).await.unwrap();
    assert_eq!(crawler.phase(), CrawlPhase::Completed);

    let results = crawler.results();
    assert_eq!(results.pages.len(), 4);
    let mut urls: Vec<&str> = results.pages.iter().map(|p| p.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 4, "no URL may be processed twice");
}

#[tokio::test]
async fn test_resume_after_completion_is_refused() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();
    mount_page(&server, "/", page_html("Inicio", "Portada", &[])).await;

    let mut crawler = Crawler::new(create_test_config(&format!("{}/", base))).unwrap();
    crawler.run(None, None).await.unwrap();
    assert_eq!(crawler.phase(), CrawlPhase::Completed);

    assert!(crawler.resume().is_err());
}

#[tokio::test]
async fn test_url_list_mode_ignores_unlisted_links() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();

    mount_page(
        &server,
        "/primera",
        page_html("Primera", "Uno", &[format!("{}/fuera-de-lista", base)]),
    )
    .await;
    mount_page(&server, "/segunda", page_html("Segunda", "Dos", &[])).await;
    mount_page(
        &server,
        "/fuera-de-lista",
        page_html("Oculta", "Tres", &[]),
    )
    .await;

    let mut config = CrawlConfig::for_urls(vec![
        format!("{}/primera", base),
        format!("{}/segunda", base),
    ]);
    config.delay_ms = 10;
    config.verifier.max_retries = 0;

    let mut crawler = Crawler::new(config).unwrap();
    crawler.run(None, None).await.unwrap();

    let results = crawler.results();
    // Only listed URLs are analyzed; the discovered link is recorded but
    // never crawled
    assert_eq!(results.pages.len(), 2);
    assert!(results
        .links
        .iter()
        .any(|l| l.target_url.ends_with("/fuera-de-lista")));
    assert!(!results
        .pages
        .iter()
        .any(|p| p.url.ends_with("/fuera-de-lista")));
}

#[tokio::test]
async fn test_images_verified_during_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0u8; 2048]),
        )
        .mount(&server)
        .await;
    mount_head_ok(&server).await;

    let body = format!(
        "<html><head><title>Inicio</title></head><body><h1>Portada</h1><p>{}</p><img src=\"/logo.png\" alt=\"Logo\" /></body></html>",
        "texto de contenido principal ".repeat(8)
    );
    mount_page(&server, "/", body).await;

    let mut crawler = Crawler::new(create_test_config(&format!("{}/", base))).unwrap();
    crawler.run(None, None).await.unwrap();

    let results = crawler.results();
    assert_eq!(results.images.len(), 1);
    assert_eq!(results.images[0].state, ImageState::Funcional);
    assert_eq!(results.images[0].image_type, "PNG");
    assert_eq!(results.images[0].size, "2.0 KB");
    assert_eq!(results.images[0].alt, "Logo");
}

#[tokio::test]
async fn test_error_page_gets_stub_record() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        page_html("Inicio", "Portada", &[format!("{}/caida", base)]),
    )
    .await;
    // A full error page body keeps the strategy selector on the plain path
    Mock::given(method("GET"))
        .and(path("/caida"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_raw(
                    page_html("Error del servidor", "Algo falló", &[]).into_bytes(),
                    "text/html",
                ),
        )
        .mount(&server)
        .await;

    let mut crawler = Crawler::new(create_test_config(&format!("{}/", base))).unwrap();
    crawler.run(None, None).await.unwrap();

    let results = crawler.results();
    // Exactly one record per processed URL, the failed one as a stub
    assert_eq!(results.pages.len(), 2);
    let stub = results
        .pages
        .iter()
        .find(|p| p.url.ends_with("/caida"))
        .unwrap();
    assert_eq!(stub.status, PageStatus::Code(500));
    assert!(stub.title.is_none());
}

#[tokio::test]
async fn test_report_written_from_crawl_results() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        page_html("Inicio", "Portada", &[format!("{}/a", base)]),
    )
    .await;
    mount_page(&server, "/a", page_html("Página A", "Primera", &[])).await;

    let mut crawler = Crawler::new(create_test_config(&format!("{}/", base))).unwrap();
    crawler.run(None, None).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let meta = ReportMeta::whole_site(&base, Duration::from_secs(3));
    let written = write_report(&crawler.results(), dir.path(), &meta).unwrap();

    assert_eq!(written.len(), 5);
    let summary = std::fs::read_to_string(dir.path().join("resumen_seo.csv")).unwrap();
    assert!(summary.contains("Total Páginas Analizadas,2"));
    assert!(summary.contains(&base));

    let pages = std::fs::read_to_string(dir.path().join("detalles_por_pagina.csv")).unwrap();
    assert!(pages.contains("Página A"));
}

#[tokio::test]
async fn test_progress_counts_reported() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    let base = server.uri();
    mount_page(&server, "/", page_html("Inicio", "Portada", &[])).await;

    let updates = Arc::new(std::sync::Mutex::new(Vec::new()));
    let updates_cb = Arc::clone(&updates);
    let progress: ProgressCallback = Arc::new(move |update: ProgressUpdate| {
        updates_cb.lock().unwrap().push(update);
    });

    let completed = Arc::new(AtomicUsize::new(0));
    let completed_cb = Arc::clone(&completed);
    let completion: CompletionCallback = Arc::new(move || {
        completed_cb.fetch_add(1, Ordering::SeqCst);
    });

    let mut crawler = Crawler::new(create_test_config(&format!("{}/", base))).unwrap();
    crawler.run(Some(progress), Some(completion)).await.unwrap();

    assert_eq!(completed.load(Ordering::SeqCst), 1);

    let updates = updates.lock().unwrap();
    // Unlimited crawls report an unbounded total
    let counted = updates.iter().find(|u| u.counts.is_some()).unwrap();
    let counts = counted.counts.unwrap();
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.total, None);
    assert_eq!(counts.pending, 0);
}
