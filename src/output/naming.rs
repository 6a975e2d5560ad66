use crate::output::text::fold_char;
use crate::url::domain_slug;
use chrono::{DateTime, Utc};
use url::Url;

/// Longest keyword part of a filename
const MAX_KEYWORD_CHARS: usize = 50;

/// Filenames longer than this lose their keyword part
const MAX_FILENAME_CHARS: usize = 150;

/// Keywords used in a filename
const MAX_FILENAME_KEYWORDS: usize = 3;

/// Builds the deterministic output filename for one page
///
/// Pattern: `NNN_YYYYMMDD_HHMMSS_kw1_kw2_kw3_domain.pdf`. The sequence number
/// is unique within a run, which makes the whole name unique.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use site2pdf::output::pdf_filename;
/// use url::Url;
///
/// let fetched = Utc.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap();
/// let url = Url::parse("https://www.example.com/about").unwrap();
/// let keywords = vec!["community garden".to_string(), "volunteers".to_string()];
///
/// assert_eq!(
///     pdf_filename(7, &fetched, &keywords, &url),
///     "007_20260301_140509_community_garden_volunteers_example_com.pdf"
/// );
/// ```
pub fn pdf_filename(
    sequence: u32,
    fetched_at: &DateTime<Utc>,
    keywords: &[String],
    url: &Url,
) -> String {
    let prefix = format!("{:03}_{}", sequence, fetched_at.format("%Y%m%d_%H%M%S"));
    let domain = domain_slug(url);
    let keyword_part = keyword_slug(keywords);

    if keyword_part.is_empty() {
        return format!("{}_{}.pdf", prefix, domain);
    }

    let filename = format!("{}_{}_{}.pdf", prefix, keyword_part, domain);
    if filename.len() > MAX_FILENAME_CHARS {
        format!("{}_{}.pdf", prefix, domain)
    } else {
        filename
    }
}

/// Joins up to three keywords with `_`, keeping only `[A-Za-z0-9_-]`
fn keyword_slug(keywords: &[String]) -> String {
    let joined = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .take(MAX_FILENAME_KEYWORDS)
        .collect::<Vec<_>>()
        .join("_");

    let mut slug = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            slug.push(c);
        } else if c == '_' || c.is_whitespace() {
            if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        } else if let Some(folded) = fold_char(c) {
            slug.extend(folded.chars().filter(|f| f.is_ascii_alphanumeric()));
        }
    }

    slug.truncate(MAX_KEYWORD_CHARS);
    slug.trim_end_matches(['_', '-']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn fetched() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
    }

    fn url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_basic_pattern() {
        let name = pdf_filename(1, &fetched(), &["hello world".to_string()], &url());
        assert_eq!(name, "001_20261018_093000_hello_world_example_com.pdf");
    }

    #[test]
    fn test_without_keywords() {
        let name = pdf_filename(12, &fetched(), &[], &url());
        assert_eq!(name, "012_20261018_093000_example_com.pdf");
    }

    #[test]
    fn test_keywords_sanitized() {
        let keywords = vec![
            "Grüße/aus".to_string(),
            "a:b*c?".to_string(),
            "  ".to_string(),
            "x-ray".to_string(),
        ];
        let name = pdf_filename(2, &fetched(), &keywords, &url());
        assert_eq!(name, "002_20261018_093000_Gruesseaus_abc_x-ray_example_com.pdf");
    }

    #[test]
    fn test_only_three_keywords_used() {
        let keywords: Vec<String> = ["one", "two", "three", "four"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let name = pdf_filename(3, &fetched(), &keywords, &url());
        assert_eq!(name, "003_20261018_093000_one_two_three_example_com.pdf");
    }

    #[test]
    fn test_keyword_part_capped() {
        let keywords = vec!["a".repeat(40), "b".repeat(40)];
        let name = pdf_filename(4, &fetched(), &keywords, &url());
        let keyword_part = name
            .trim_start_matches("004_20261018_093000_")
            .trim_end_matches("_example_com.pdf");
        assert_eq!(keyword_part.len(), 50);
    }

    #[test]
    fn test_name_length_bounded() {
        let url = Url::parse("https://a-very-long-subdomain-name-for-testing.example.org/").unwrap();
        let keywords = vec!["k".repeat(60)];
        let name = pdf_filename(5, &fetched(), &keywords, &url);
        assert!(name.len() <= 150);
        assert!(name.starts_with("005_20261018_093000_"));
    }

    #[test]
    fn test_names_unique_across_sequence() {
        let keywords = vec!["same".to_string()];
        let names: HashSet<String> = (1..=200)
            .map(|seq| pdf_filename(seq, &fetched(), &keywords, &url()))
            .collect();
        assert_eq!(names.len(), 200);
    }
}
