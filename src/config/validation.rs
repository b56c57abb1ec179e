use crate::config::types::{Config, CrawlerConfig, IndexConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_index_config(&config.index)?;
    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            config.seed_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            config.seed_url
        )));
    }

    if config.site_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site_name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.drill_depth > 5 {
        return Err(ConfigError::Validation(format!(
            "drill_depth must be at most 5, got {}",
            config.drill_depth
        )));
    }

    if config.resolve_depth < 1 || config.resolve_depth > 10 {
        return Err(ConfigError::Validation(format!(
            "resolve_depth must be between 1 and 10, got {}",
            config.resolve_depth
        )));
    }

    if config.listing_page_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "listing_page_cap must be >= 1, got {}",
            config.listing_page_cap
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the index section
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.database_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}
