//! Configuration module for page-trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use page_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("page-trawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BatchConfig, Config, CrawlerConfig, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};

pub use validation::{
    validate, MAX_CONCURRENT_RANGE, MAX_DEPTH_RANGE, MAX_PAGES_RANGE, TIMEOUT_RANGE,
};
