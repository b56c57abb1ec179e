use serde::Deserialize;

/// Main configuration structure for Strata
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// The site being walked
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Entry point; may be a forwarding service that redirects to the live mirror
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Site name as it appears in footer boilerplate (e.g. "Moviesda Home")
    #[serde(rename = "site-name")]
    pub site_name: String,
}

/// Crawl pacing and recursion limits
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Delay after each indexed item (milliseconds)
    #[serde(rename = "pacing-delay", default = "default_pacing_delay")]
    pub pacing_delay: u64,

    /// Maximum nesting of single-entry wrapper folders at the file level
    #[serde(rename = "drill-depth", default = "default_drill_depth")]
    pub drill_depth: u32,

    /// Maximum recursive hops when resolving a final media link
    #[serde(rename = "resolve-depth", default = "default_resolve_depth")]
    pub resolve_depth: u32,

    /// Default number of listing pages read by on-demand queries
    #[serde(rename = "listing-page-cap", default = "default_listing_page_cap")]
    pub listing_page_cap: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            pacing_delay: default_pacing_delay(),
            drill_depth: default_drill_depth(),
            resolve_depth: default_resolve_depth(),
            listing_page_cap: default_listing_page_cap(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Persistent index configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexConfig {
    /// Path to the SQLite index; when absent, index features are disabled
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_pacing_delay() -> u64 {
    200
}

fn default_drill_depth() -> u32 {
    2
}

fn default_resolve_depth() -> u32 {
    3
}

fn default_listing_page_cap() -> u32 {
    3
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}
