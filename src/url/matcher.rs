/// Checks whether `candidate` matches a wildcard `pattern`
///
/// `*` stands for zero or more characters; every other character in the
/// pattern is matched literally. Patterns come from tool callers, so no regex
/// engine is ever built from them: the pattern is split on `*` and each
/// literal segment is located in order.
///
/// - The first segment is anchored at the start unless the pattern begins with `*`.
/// - The last segment is anchored at the end unless the pattern ends with `*`.
///
/// # Examples
///
/// ```
/// use page_trawl::url::matches;
///
/// assert!(matches("report.md", "*.md"));
/// assert!(matches("scraped_2024.md", "scraped_*"));
/// assert!(matches("anything", "*"));
/// assert!(!matches("notes.txt", "*.md"));
/// assert!(!matches("", "x"));
/// ```
pub fn matches(candidate: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return candidate == pattern;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let last = segments.len() - 1;
    let anchored_start = !pattern.starts_with('*');
    let anchored_end = !pattern.ends_with('*');

    let mut pos = 0;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }

        if i == 0 && anchored_start {
            if !candidate.starts_with(segment) {
                return false;
            }
            pos = segment.len();
            continue;
        }

        if i == last && anchored_end {
            // The tail must not overlap anything already consumed
            return candidate.len() >= pos + segment.len() && candidate.ends_with(segment);
        }

        match candidate[pos..].find(segment) {
            Some(offset) => pos += offset + segment.len(),
            None => return false,
        }
    }

    true
}

/// Returns the items that match `pattern`, preserving their order
///
/// A missing pattern keeps everything.
pub fn filter_matching<'a, I>(items: I, pattern: Option<&str>) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    items
        .into_iter()
        .filter(|item| pattern.map_or(true, |p| matches(item, p)))
        .collect()
}
