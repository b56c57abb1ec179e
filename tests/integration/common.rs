//! Shared fixtures for the integration tests

use std::path::Path;
use strata::config::{parse_config, Config};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches requests that carry no query string (page 1 of a listing)
pub struct NoQuery;

impl Match for NoQuery {
    fn matches(&self, request: &Request) -> bool {
        request.url.query().is_none()
    }
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// Serves `body` at `route` when no query string is present
pub async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(NoQuery)
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Serves `body` as page `number` (>= 2) of the listing at `route`
pub async fn mount_listing_page(server: &MockServer, route: &str, number: u32, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", number.to_string()))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Redirects `route` on `server` to `target`
pub async fn mount_redirect(server: &MockServer, route: &str, target: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", target))
        .mount(server)
        .await;
}

/// Number of requests `server` received for `route` with the given query
pub async fn requests_for(server: &MockServer, route: &str, query: Option<&str>) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route && request.url.query() == query)
        .count()
}

/// Builds a validated configuration for a test site
pub fn config(seed_url: &str, database: Option<&Path>) -> Config {
    let index = match database {
        Some(path) => format!("[index]\ndatabase-path = {:?}\n", path.display().to_string()),
        None => String::new(),
    };

    let toml = format!(
        r#"
[site]
seed-url = "{}"
site-name = "Moviesda"

[crawler]
pacing-delay = 0
request-timeout = 5

{}"#,
        seed_url, index
    );

    parse_config(&toml).expect("test config is valid")
}
