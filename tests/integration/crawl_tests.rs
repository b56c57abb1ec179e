//! Integration tests for indexing passes
//!
//! A forwarding server redirects the seed to a mirror server; every listing
//! link on the mirror is relative, so these also exercise origin tracking.

use crate::common::{config, mount_listing_page, mount_page, mount_redirect, requests_for};
use std::sync::Arc;
use strata::crawler::{crawl, Indexer, PassOutcome};
use strata::storage::{open_shared, open_storage, RunStatus, Storage};
use tempfile::TempDir;
use wiremock::MockServer;

/// Mirror with two year categories and four listings
///
/// - Tamil 2025 Movies: Amaran and Leo on page 1, Vidaamuyarchi on page 2,
///   an empty page 3
/// - Tamil 2024 Movies: Leo again and Maharaja, then a page repeating Maharaja
/// - Vidaamuyarchi's detail page is not served
async fn mount_mirror(mirror: &MockServer) {
    mount_page(
        mirror,
        "/",
        r#"<a href="/tamil-2025-movies/">Tamil 2025 Movies</a>
           <a href="/tamil-2024-movies/">Tamil 2024 Movies</a>
           <a href="/about/">About Us</a>"#,
    )
    .await;

    mount_page(
        mirror,
        "/tamil-2025-movies/",
        r#"<a href="/tamil-2024-movies/">Tamil 2024 Movies</a>
           <a href="/amaran/">Amaran (2024)</a>
           <a href="/leo/">Leo (2023)</a>
           <a href="/tamil-2025-movies/?page=2">Next</a>"#,
    )
    .await;
    mount_listing_page(
        mirror,
        "/tamil-2025-movies/",
        2,
        r#"<a href="/vidaamuyarchi/">Vidaamuyarchi (2025)</a>"#,
    )
    .await;
    mount_listing_page(mirror, "/tamil-2025-movies/", 3, "<p>No more movies</p>").await;

    mount_page(
        mirror,
        "/tamil-2024-movies/",
        r#"<a href="/leo/">Leo (2023)</a><a href="/maharaja/">Maharaja (2024)</a>"#,
    )
    .await;
    mount_listing_page(
        mirror,
        "/tamil-2024-movies/",
        2,
        r#"<a href="/maharaja/">Maharaja (2024)</a>"#,
    )
    .await;

    for slug in ["amaran", "leo", "maharaja"] {
        mount_page(
            mirror,
            &format!("/{}/", slug),
            &format!(
                r#"<img src="/icons/folder.gif"><img src="/posters/{slug}.jpg">
                   <div class="f"><a href="/{slug}/hd/">HD</a></div>"#
            ),
        )
        .await;
    }
}

/// Forwarding server whose root redirects to the mirror
async fn forwarder_to(mirror: &MockServer) -> MockServer {
    let forwarder = MockServer::start().await;
    mount_redirect(&forwarder, "/", &format!("{}/", mirror.uri())).await;
    forwarder
}

#[tokio::test]
async fn test_full_pass_follows_forwarded_origin() {
    let mirror = MockServer::start().await;
    mount_mirror(&mirror).await;
    let forwarder = forwarder_to(&mirror).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("index.db");
    let config = config(&format!("{}/", forwarder.uri()), Some(&db_path));

    let outcome = crawl(&config, "test-hash").await.expect("Crawl failed");
    let PassOutcome::Completed(report) = outcome else {
        panic!("expected a completed pass");
    };

    assert_eq!(report.categories, 2);
    assert_eq!(report.pages, 3);
    assert_eq!(report.upserted, 4);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.enriched, 3);
    assert_eq!(report.enrichment_failures, 1);
    assert_eq!(report.category_failures, 0);

    // Pagination ended on the empty page and on the repeated page
    assert_eq!(requests_for(&mirror, "/tamil-2025-movies/", Some("page=3")).await, 1);
    assert_eq!(requests_for(&mirror, "/tamil-2025-movies/", Some("page=4")).await, 0);
    assert_eq!(requests_for(&mirror, "/tamil-2024-movies/", Some("page=3")).await, 0);

    let storage = open_storage(&db_path).expect("Failed to open DB");
    let amaran = storage
        .get_document(&format!("{}/amaran/", mirror.uri()))
        .unwrap()
        .expect("Amaran indexed under the mirror origin");
    assert_eq!(amaran.title, "Amaran (2024)");
    assert_eq!(amaran.year_category.as_deref(), Some("Tamil 2025 Movies"));
    assert_eq!(
        amaran.poster.as_deref(),
        Some(format!("{}/posters/amaran.jpg", mirror.uri()).as_str())
    );

    // First category to list Leo keeps it
    let leo = storage
        .get_document(&format!("{}/leo/", mirror.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(leo.year_category.as_deref(), Some("Tamil 2025 Movies"));

    let vidaamuyarchi = storage
        .get_document(&format!("{}/vidaamuyarchi/", mirror.uri()))
        .unwrap()
        .expect("listing kept despite failed deep index");
    assert!(!vidaamuyarchi.is_enriched());

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, report.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert!(run.finished_at.is_some());
}

#[tokio::test]
async fn test_second_pass_is_idempotent() {
    let mirror = MockServer::start().await;
    mount_mirror(&mirror).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("index.db");
    let config = config(&format!("{}/", mirror.uri()), Some(&db_path));

    let first = crawl(&config, "hash").await.unwrap();
    let stats_after_first = open_storage(&db_path).unwrap().stats().unwrap();

    let PassOutcome::Completed(second) = crawl(&config, "hash").await.unwrap() else {
        panic!("expected a completed pass");
    };
    let stats_after_second = open_storage(&db_path).unwrap().stats().unwrap();

    assert!(matches!(first, PassOutcome::Completed(_)));
    assert_eq!(stats_after_first, stats_after_second);
    assert_eq!(stats_after_second.documents, 4);
    assert_eq!(stats_after_second.enriched, 3);

    // Listings with a stored poster are not deep-indexed again
    assert_eq!(second.skipped, 3);
    assert_eq!(second.enriched, 0);
    assert_eq!(second.enrichment_failures, 1);
    for slug in ["amaran", "leo", "maharaja"] {
        assert_eq!(requests_for(&mirror, &format!("/{}/", slug), None).await, 1);
    }
    assert_eq!(requests_for(&mirror, "/vidaamuyarchi/", None).await, 2);
}

#[tokio::test]
async fn test_unreachable_seed_fails_the_run() {
    let mirror = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("index.db");
    let config = config(&format!("{}/", mirror.uri()), Some(&db_path));

    let storage = open_shared(&config.index).unwrap();
    let indexer = Indexer::from_config(&config, storage).unwrap();

    let result = indexer.run_pass().await;
    assert!(matches!(result, Err(strata::StrataError::CriticalCrawl(_))));
    assert!(!indexer.is_running());

    let run = open_storage(&db_path).unwrap().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_search_after_pass() {
    let mirror = MockServer::start().await;
    mount_mirror(&mirror).await;

    let dir = TempDir::new().unwrap();
    let config = config(&format!("{}/", mirror.uri()), Some(&dir.path().join("index.db")));

    let indexer = Arc::new(
        Indexer::from_config(&config, open_shared(&config.index).unwrap())
            .unwrap()
            .with_config_hash("hash"),
    );
    assert!(matches!(indexer.run_pass().await, Ok(PassOutcome::Completed(_))));

    let hits = indexer.search("maha").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].link, format!("{}/maharaja/", mirror.uri()));

    assert!(indexer.search("   ").unwrap().is_empty());

    let status = indexer.status().unwrap();
    assert!(status.enabled);
    assert!(!status.running);
    assert_eq!(status.stats.unwrap().documents, 4);
}

#[tokio::test]
async fn test_pass_without_index_is_disabled() {
    let mirror = MockServer::start().await;
    mount_mirror(&mirror).await;

    let config = config(&format!("{}/", mirror.uri()), None);
    let outcome = crawl(&config, "hash").await.unwrap();

    assert_eq!(outcome, PassOutcome::Disabled);
    assert_eq!(requests_for(&mirror, "/", None).await, 0);
}
