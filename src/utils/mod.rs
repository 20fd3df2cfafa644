// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract an event identifier from a detail-page URL.
///
/// Recognizes the query and path shapes the scraped sites use:
/// `?event=123`, `?event_id=123`, `/events/view/123`, `/event/123`, and
/// slug paths like `/events/jazz-night-2025`.
pub fn extract_event_id(url: &str) -> Option<String> {
    let query_pattern = regex::Regex::new(r"[?&](?:event|event_id|id)=(\d+)").ok()?;
    if let Some(caps) = query_pattern.captures(url) {
        return Some(caps[1].to_string());
    }

    let path_pattern = regex::Regex::new(r"/events?/(?:view/)?(\d+)(?:[/?#]|$)").ok()?;
    if let Some(caps) = path_pattern.captures(url) {
        return Some(caps[1].to_string());
    }

    let slug_pattern = regex::Regex::new(r"/events?/([a-z0-9][a-z0-9-]+)(?:[/?#]|$)").ok()?;
    if let Some(caps) = slug_pattern.captures(url) {
        return Some(caps[1].to_string());
    }

    None
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_extract_event_id_query() {
        assert_eq!(
            extract_event_id("https://example.com/view?event=123"),
            Some("123".to_string())
        );
        assert_eq!(
            extract_event_id("https://example.com/page?a=1&event_id=456"),
            Some("456".to_string())
        );
    }

    #[test]
    fn test_extract_event_id_path() {
        assert_eq!(
            extract_event_id("https://example.com/events/view/789"),
            Some("789".to_string())
        );
        assert_eq!(
            extract_event_id("https://example.com/event/42"),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_extract_event_id_slug() {
        assert_eq!(
            extract_event_id("https://example.com/events/jazz-night-2025"),
            Some("jazz-night-2025".to_string())
        );
    }

    #[test]
    fn test_extract_event_id_none() {
        assert_eq!(extract_event_id("https://example.com/about"), None);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    }
}
