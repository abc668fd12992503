use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid"];

/// Normalizes a URL so that equivalent links share one crawl key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not http or https
/// 3. Lowercase the host
/// 4. Remove dot segments, duplicate slashes and the trailing slash (except for root /)
/// 5. Remove the fragment
/// 6. Remove tracking query parameters and sort the rest
/// 7. Remove an empty query string
///
/// # Examples
///
/// ```
/// use page_trawl::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/a/../docs/?utm_source=x#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL; see [`normalize_url`]
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();
    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(input: &str) -> String {
        normalize_url(input).unwrap().to_string()
    }

    #[test]
    fn test_equivalent_links_collapse() {
        // Links a crawler sees for the same page must dedupe to one key
        let variants = [
            "https://Docs.Example.com/guide/",
            "https://docs.example.com/guide#install",
            "https://docs.example.com/./guide?utm_source=newsletter",
            "https://docs.example.com//guide?fbclid=abc&utm_medium=email",
            "https://docs.example.com/api/../guide",
        ];
        for variant in variants {
            assert_eq!(normalized(variant), "https://docs.example.com/guide", "{}", variant);
        }
    }

    #[test]
    fn test_root_and_scheme_survive() {
        assert_eq!(normalized("https://example.com"), "https://example.com/");
        assert_eq!(normalized("https://example.com/"), "https://example.com/");
        assert_eq!(normalized("http://example.com/a"), "http://example.com/a");
        assert_eq!(normalized("https://www.example.com/a"), "https://www.example.com/a");
        assert_eq!(normalized("http://127.0.0.1:8080/page/"), "http://127.0.0.1:8080/page");
    }

    #[test]
    fn test_query_kept_sorted() {
        assert_eq!(
            normalized("https://example.com/search?q=rust&page=2&utm_campaign=x"),
            "https://example.com/search?page=2&q=rust"
        );
        assert_eq!(normalized("https://example.com/Case/Path"), "https://example.com/Case/Path");
    }

    #[test]
    fn test_rejects_non_web_urls() {
        assert!(matches!(
            normalize_url("ftp://example.com/file").unwrap_err(),
            UrlError::InvalidScheme(_)
        ));
        assert!(matches!(
            normalize_url("javascript:alert(1)").unwrap_err(),
            UrlError::InvalidScheme(_)
        ));
        assert!(normalize_url("/relative/only").is_err());
    }

    #[test]
    fn test_normalize_parsed_matches_string_form() {
        let parsed = Url::parse("https://EXAMPLE.com/a/?b=1&a=2#top").unwrap();
        assert_eq!(
            normalize_parsed(parsed).unwrap().as_str(),
            normalized("https://example.com/a?a=2&b=1")
        );
    }
}
