use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Scheme + host (+ port) of the page most recently served
///
/// The seed URL is often a forwarding service, so the origin relative links
/// must be joined against is only known after the first redirect settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    root: Url,
}

impl Origin {
    /// Extracts the origin of an absolute http(s) URL
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use strata::url::Origin;
    ///
    /// let url = Url::parse("https://mirror.example.net/tamil-2025-movies/?page=2").unwrap();
    /// let origin = Origin::from_url(&url).unwrap();
    /// assert_eq!(origin.to_string(), "https://mirror.example.net");
    /// ```
    pub fn from_url(url: &Url) -> UrlResult<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }
        if url.host_str().is_none() {
            return Err(UrlError::MissingHost(url.to_string()));
        }

        let serialized = url.origin().ascii_serialization();
        let root = Url::parse(&serialized).map_err(|e| UrlError::Parse(e.to_string()))?;
        Ok(Self { root })
    }

    /// Parses an origin from any absolute URL string
    pub fn parse(url: &str) -> UrlResult<Self> {
        let url = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;
        Self::from_url(&url)
    }

    /// Joins a reference against this origin; absolute references pass through untouched
    pub fn resolve(&self, reference: &str) -> UrlResult<String> {
        let reference = reference.trim();
        if is_absolute(reference) {
            return Ok(reference.to_string());
        }

        self.root
            .join(reference)
            .map(|joined| joined.to_string())
            .map_err(|e| UrlError::Join {
                base: self.to_string(),
                reference: reference.to_string(),
                message: e.to_string(),
            })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root.origin().ascii_serialization())
    }
}

/// Returns true when `reference` is already an absolute http(s) URL
pub fn is_absolute(reference: &str) -> bool {
    match Url::parse(reference) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}
