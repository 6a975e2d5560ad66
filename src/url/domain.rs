use url::Url;

/// Reduces a host to the site a crawl is confined to
///
/// The leading `www.` label is dropped so that `www.example.com` and
/// `example.com` describe the same site; every subdomain of the result is
/// in scope as well.
///
/// ```
/// use site2pdf::url::site_of;
///
/// assert_eq!(site_of("WWW.Example.com"), "example.com");
/// assert_eq!(site_of("docs.example.com"), "docs.example.com");
/// ```
pub fn site_of(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    }
}

/// Filesystem-safe rendering of a URL's domain, used in output filenames
///
/// `www.` is dropped, every character outside `[A-Za-z0-9_-]` becomes `_`
/// and the result is capped at 30 characters.
pub fn domain_slug(url: &Url) -> String {
    let site = match url.host_str() {
        Some(host) => site_of(host),
        None => return "unknown".to_string(),
    };

    let mut slug: String = site
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    slug.truncate(30);
    slug
}
