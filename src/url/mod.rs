//! URL handling module for page-trawl
//!
//! This module provides URL normalization, host extraction, link scope
//! classification and the wildcard matcher used for caller-supplied filters.

mod domain;
mod matcher;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use matcher::{filter_matching, matches};
pub use normalize::{normalize_parsed, normalize_url};

/// Where a discovered link points relative to the crawl seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkScope {
    /// Same hostname as the seed; eligible for traversal
    Internal,
    /// Any other hostname; recorded at most, never followed
    External,
}

impl LinkScope {
    /// Returns true if links of this scope may be followed
    pub fn should_follow(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Classifies a link against the seed URL by hostname
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_trawl::url::{classify_link, LinkScope};
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// let docs = Url::parse("https://example.com/docs").unwrap();
/// let other = Url::parse("https://other.org/").unwrap();
/// assert_eq!(classify_link(&docs, &seed), LinkScope::Internal);
/// assert_eq!(classify_link(&other, &seed), LinkScope::External);
/// ```
pub fn classify_link(link: &Url, seed: &Url) -> LinkScope {
    if same_host(link, seed) {
        LinkScope::Internal
    } else {
        LinkScope::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://example.com/start").unwrap()
    }

    #[test]
    fn test_classify_internal() {
        let link = Url::parse("https://example.com/other?page=2").unwrap();
        assert_eq!(classify_link(&link, &seed()), LinkScope::Internal);
    }

    #[test]
    fn test_classify_subdomain_is_external() {
        let link = Url::parse("https://docs.example.com/").unwrap();
        assert_eq!(classify_link(&link, &seed()), LinkScope::External);
    }

    #[test]
    fn test_classify_scheme_change_is_internal() {
        let link = Url::parse("http://example.com/").unwrap();
        assert_eq!(classify_link(&link, &seed()), LinkScope::Internal);
    }

    #[test]
    fn test_should_follow() {
        assert!(LinkScope::Internal.should_follow());
        assert!(!LinkScope::External.should_follow());
    }
}
