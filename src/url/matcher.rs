/// Returns true if `host` is `site` itself or one of its subdomains
///
/// Labels are compared whole, so `notexample.com` is not part of
/// `example.com`. Both arguments are expected in lowercase.
///
/// # Examples
///
/// ```
/// use site2pdf::url::host_in_site;
///
/// assert!(host_in_site("example.com", "example.com"));
/// assert!(host_in_site("example.com", "api.v2.example.com"));
/// assert!(!host_in_site("example.com", "notexample.com"));
/// ```
pub fn host_in_site(site: &str, host: &str) -> bool {
    match host.strip_suffix(site) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

/// Returns the first ignore pattern contained in `target`
///
/// Patterns are expected in lowercase; `target` is lowercased before
/// matching so the comparison is case-insensitive.
pub fn find_ignore_pattern<'a>(patterns: &'a [String], target: &str) -> Option<&'a str> {
    let target = target.to_lowercase();
    patterns
        .iter()
        .map(String::as_str)
        .find(|pattern| target.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_and_subdomains() {
        assert!(host_in_site("example.com", "example.com"));
        assert!(host_in_site("example.com", "www.example.com"));
        assert!(host_in_site("example.com", "deep.nested.sub.example.com"));
    }

    #[test]
    fn test_partial_labels_rejected() {
        assert!(!host_in_site("example.com", "myexample.com"));
        assert!(!host_in_site("example.com", "example.com.org"));
        assert!(!host_in_site("example.com", ""));
        assert!(!host_in_site("blog.example.com", "example.com"));
    }

    #[test]
    fn test_ip_hosts() {
        assert!(host_in_site("127.0.0.1", "127.0.0.1"));
        assert!(!host_in_site("127.0.0.1", "27.0.0.1"));
    }

    #[test]
    fn test_find_ignore_pattern() {
        let patterns = vec!["login".to_string(), "page=".to_string()];

        assert_eq!(find_ignore_pattern(&patterns, "/user/Login"), Some("login"));
        assert_eq!(find_ignore_pattern(&patterns, "/blog?page=2"), Some("page="));
        assert_eq!(find_ignore_pattern(&patterns, "/about"), None);
    }

    #[test]
    fn test_find_ignore_pattern_empty_list() {
        assert_eq!(find_ignore_pattern(&[], "/anything"), None);
    }
}
