//! URL handling module for Strata
//!
//! This module provides origin tracking for relative-link resolution and the
//! page-numbering scheme used by paginated listing pages.

mod origin;

pub use origin::{is_absolute, Origin};

/// Builds the URL of listing page `page` (1-based) under `base`
///
/// Page 1 is the base itself. Later pages append `?page=N`, inserting a `/`
/// first when the base does not already end in one.
///
/// # Examples
///
/// ```
/// use strata::url::page_url;
///
/// assert_eq!(page_url("https://x.net/tamil-2025-movies/", 1), "https://x.net/tamil-2025-movies/");
/// assert_eq!(page_url("https://x.net/tamil-2025-movies/", 2), "https://x.net/tamil-2025-movies/?page=2");
/// assert_eq!(page_url("https://x.net/tamil-2025-movies", 3), "https://x.net/tamil-2025-movies/?page=3");
/// ```
pub fn page_url(base: &str, page: u32) -> String {
    if page <= 1 {
        return base.to_string();
    }

    let separator = if base.ends_with('/') { "?" } else { "/?" };
    format!("{}{}page={}", base, separator, page)
}
