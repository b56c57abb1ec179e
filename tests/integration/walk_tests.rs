//! Integration tests for on-demand walks over HTTP

use crate::common::{config, mount_listing_page, mount_page, requests_for};
use std::sync::Arc;
use strata::crawler::Indexer;
use strata::{QueryService, Walker};
use wiremock::MockServer;

fn query_service(seed: &str) -> QueryService {
    let config = config(seed, None);
    let indexer = Arc::new(Indexer::from_config(&config, None).unwrap());
    QueryService::from_config(&config, indexer).unwrap()
}

#[tokio::test]
async fn test_auto_stream_end_to_end() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/amaran/",
        r#"<img src="/posters/amaran.jpg">
           <div class="f"><a href="/amaran/original/">Original</a></div>
           <div class="f"><a href="/amaran/720p/">720p HD</a></div>"#,
    )
    .await;
    mount_page(
        &site,
        "/amaran/720p/",
        r#"<div class="f"><a href="/file/1/">Amaran Sample 720p</a></div>
           <div class="f"><a href="/file/2/">Amaran 720p HD</a></div>"#,
    )
    .await;
    mount_page(
        &site,
        "/file/2/",
        r#"<a href="/">Home</a><a href="/download/2/server1">Download Server 1</a>"#,
    )
    .await;
    mount_page(&site, "/download/2/server1", r#"<a href="/download/2/server2">Server 2</a>"#).await;
    mount_page(
        &site,
        "/download/2/server2",
        r#"<meta http-equiv="refresh" content="0; url=/media/amaran-720p.mp4">"#,
    )
    .await;

    let service = query_service(&format!("{}/", base));
    let resolution = service
        .auto_stream(&format!("{}/amaran/", base))
        .await
        .expect("stream resolves");

    assert_eq!(resolution.stream_url, format!("{}/media/amaran-720p.mp4", base));
    assert_eq!(resolution.quality_name, "720p HD");
    assert_eq!(resolution.filename, "Amaran 720p HD");
    assert_eq!(resolution.poster, Some(format!("{}/posters/amaran.jpg", base)));

    // Only the selected branch is walked
    assert_eq!(requests_for(&site, "/amaran/original/", None).await, 0);
    assert_eq!(requests_for(&site, "/file/1/", None).await, 0);
    assert_eq!(requests_for(&site, "/amaran/", None).await, 1);
}

#[tokio::test]
async fn test_auto_stream_reports_missing_level() {
    let site = MockServer::start().await;
    mount_page(&site, "/leo/", r#"<div class="f"><a href="/leo/hd/">HD</a></div>"#).await;
    mount_page(
        &site,
        "/leo/hd/",
        r#"<div class="f"><a href="/leo/g/">Leo Sample</a></div>
           <div class="f"><a href="/leo/f/">Leo 480p</a></div>"#,
    )
    .await;
    mount_page(&site, "/leo/f/", r#"<a href="/contact/">Contact</a>"#).await;

    let err = query_service(&format!("{}/", site.uri()))
        .auto_stream(&format!("{}/leo/", site.uri()))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: No servers found");
}

#[tokio::test]
async fn test_listings_respect_page_cap() {
    let site = MockServer::start().await;
    let category = "/tamil-2023-movies/";

    mount_page(
        &site,
        category,
        r#"<a href="/jailer/">Jailer (2023)</a><a href="/tamil-2022-movies/">Tamil 2022 Movies</a>"#,
    )
    .await;
    for (number, slug) in [(2, "leo"), (3, "viduthalai"), (4, "maaveeran")] {
        mount_listing_page(
            &site,
            category,
            number,
            &format!(r#"<a href="/{slug}/">{slug} (2023)</a>"#),
        )
        .await;
    }

    let service = query_service(&format!("{}/", site.uri()));
    let listings = service
        .listings(&format!("{}/tamil-2023-movies", site.uri()), Some(2))
        .await
        .unwrap();

    let titles: Vec<_> = listings.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Jailer (2023)", "leo (2023)"]);
    assert_eq!(requests_for(&site, category, Some("page=3")).await, 0);

    // Default cap of three pages
    let listings = service
        .listings(&format!("{}{}", site.uri(), category), None)
        .await
        .unwrap();
    assert_eq!(listings.len(), 3);
    assert_eq!(requests_for(&site, category, Some("page=4")).await, 0);
}

#[tokio::test]
async fn test_files_drill_through_wrapper_folder() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/jailer/hd/",
        r#"<div class="f"><a href="/jailer/hd/folder/">Jailer (2023) HD</a></div>"#,
    )
    .await;
    mount_page(
        &site,
        "/jailer/hd/folder/",
        r#"<div class="f"><a href="/file/10/">Jailer Part 1</a></div>
           <div class="f"><a href="/file/11/">Jailer Part 2</a></div>"#,
    )
    .await;

    let config = config(&format!("{}/", site.uri()), None);
    let walker = Walker::from_config(&config).unwrap();
    let files = walker
        .files(&format!("{}/jailer/hd/", site.uri()))
        .await
        .unwrap();

    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Jailer Part 1", "Jailer Part 2"]);
    assert_eq!(files[0].link, format!("{}/file/10/", site.uri()));
}

#[tokio::test]
async fn test_final_link_cycle_terminates() {
    let site = MockServer::start().await;
    mount_page(&site, "/s/a", r#"<a href="/s/b">Server B</a>"#).await;
    mount_page(&site, "/s/b", r#"<a href="/s/a">Server A</a>"#).await;

    let config = config(&format!("{}/", site.uri()), None);
    let walker = Walker::from_config(&config).unwrap();
    let link = walker
        .resolve_final_link(&format!("{}/s/a", site.uri()))
        .await
        .unwrap();

    assert_eq!(link, None);
    let total = site.received_requests().await.unwrap_or_default().len();
    assert!(total <= 4, "resolution made {} requests", total);
}

#[tokio::test]
async fn test_stream_uses_first_server() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/file/3/",
        r#"<a href="/download/3/server1">Download Server 1</a>
           <a href="/download/3/server2">Download Server 2</a>"#,
    )
    .await;
    mount_page(&site, "/download/3/server1", r#"<a href="/media/three.mkv">Download</a>"#).await;

    let link = query_service(&format!("{}/", site.uri()))
        .stream(&format!("{}/file/3/", site.uri()))
        .await
        .unwrap();

    assert_eq!(link, format!("{}/media/three.mkv", site.uri()));
    assert_eq!(requests_for(&site, "/download/3/server2", None).await, 0);
}
