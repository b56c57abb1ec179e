//! Reading one page of a final-link redirect chain

use crate::classify::{anchors, LinkCandidate};
use crate::url::Origin;
use scraper::{Html, Selector};

/// Media extensions treated as directly fetchable
const MEDIA_EXTENSIONS: &[&str] = &[".mp4", ".mkv"];

/// What a redirect-chain page offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopStep {
    /// A direct media link (or a meta-refresh target when no hops remain)
    Terminal(String),
    /// Further server pages to try in order; `refresh` applies if all of them fail
    Recurse {
        hops: Vec<String>,
        refresh: Option<String>,
    },
    /// Nothing left to follow
    Unresolved,
}

/// Inspects a page of the final-link chain
///
/// Links resolving back to `current_url` are never offered as hops, so a
/// page that only links to itself ends the chain.
pub fn inspect_hop(html: &str, origin: &Origin, current_url: &str) -> HopStep {
    let document = Html::parse_document(html);
    let candidates = anchors(&document);

    if let Some(media) = candidates.iter().find_map(media_href) {
        match origin.resolve(media) {
            Ok(link) => return HopStep::Terminal(link),
            Err(e) => tracing::debug!("Unresolvable media href '{}': {}", media, e),
        }
    }

    let mut hops: Vec<String> = Vec::new();
    for candidate in candidates.iter().filter(|c| is_server_hop(c)) {
        let Some(href) = candidate.href() else {
            continue;
        };
        let Ok(next) = origin.resolve(href) else {
            continue;
        };
        if next == current_url {
            tracing::debug!("Ignoring self-referencing hop on {}", current_url);
            continue;
        }
        if !hops.contains(&next) {
            hops.push(next);
        }
    }

    let refresh = meta_refresh_target(&document).and_then(|target| origin.resolve(&target).ok());

    match (hops.is_empty(), refresh) {
        (false, refresh) => HopStep::Recurse { hops, refresh },
        (true, Some(target)) => HopStep::Terminal(target),
        (true, None) => HopStep::Unresolved,
    }
}

fn media_href(candidate: &LinkCandidate) -> Option<&str> {
    let href = candidate.href()?;
    let path = href.split(&['?', '#'][..]).next().unwrap_or(href).to_lowercase();
    MEDIA_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(ext))
        .then_some(href)
}

fn is_server_hop(candidate: &LinkCandidate) -> bool {
    let text = candidate.text.to_lowercase();
    text.contains("server") && !text.contains("home")
}

/// Target of `<meta http-equiv="refresh" content="N; url=...">`
fn meta_refresh_target(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[http-equiv]").expect("valid meta selector");

    document
        .select(&selector)
        .filter(|meta| {
            meta.value()
                .attr("http-equiv")
                .map(|value| value.trim().eq_ignore_ascii_case("refresh"))
                .unwrap_or(false)
        })
        .find_map(|meta| {
            let content = meta.value().attr("content")?;
            let start = content.to_ascii_lowercase().rfind("url=")? + "url=".len();
            let target = content[start..].trim().trim_matches(|c| c == '\'' || c == '"');
            (!target.is_empty()).then(|| target.to_string())
        })
}
