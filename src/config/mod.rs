//! Configuration module for Strata
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use strata::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("strata.toml")).unwrap();
//! println!("Final links resolve at most {} hops deep", config.crawler.resolve_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, IndexConfig, ServerConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
