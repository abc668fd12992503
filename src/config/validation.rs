use crate::config::types::{BatchConfig, Config, CrawlerConfig, FetchConfig, OutputConfig};
use crate::ConfigError;
use std::ops::RangeInclusive;

/// Allowed per-request timeout (milliseconds)
pub const TIMEOUT_RANGE: RangeInclusive<u64> = 1_000..=120_000;

/// Allowed crawl depth
pub const MAX_DEPTH_RANGE: RangeInclusive<u32> = 1..=5;

/// Allowed crawl page budget
pub const MAX_PAGES_RANGE: RangeInclusive<usize> = 1..=200;

/// Allowed batch chunk size
pub const MAX_CONCURRENT_RANGE: RangeInclusive<usize> = 1..=15;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_crawler_config(&config.crawler)?;
    validate_batch_config(&config.batch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates transport configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if !TIMEOUT_RANGE.contains(&config.timeout_ms) {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be between {} and {}, got {}",
            TIMEOUT_RANGE.start(),
            TIMEOUT_RANGE.end(),
            config.timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user-agent cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    check_range("max-depth", config.max_depth, &MAX_DEPTH_RANGE)?;
    check_range("max-pages", config.max_pages, &MAX_PAGES_RANGE)?;
    Ok(())
}

/// Validates batch configuration
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    check_range("max-concurrent", config.max_concurrent, &MAX_CONCURRENT_RANGE)
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "root-dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_range<T>(name: &str, value: T, range: &RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}
