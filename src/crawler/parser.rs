//! HTML content extraction
//!
//! This module turns a rendered document into:
//! - Readable plain text with structural boilerplate removed
//! - Outbound links to offer to the frontier
//! - The page title

use crate::config::ExtractConfig;
use regex::Regex;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Elements whose whole subtree never contributes text
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "nav", "header", "footer", "iframe", "noscript", "svg", "aside",
    "template", "form", "button", "select", "table", "meta", "link", "object", "canvas",
];

/// Elements whose text is never visible in a rendered page
const INVISIBLE_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// Elements that start a new line of text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "dl", "dt", "dd", "blockquote", "pre", "figure", "figcaption", "address", "hr", "br",
    "details", "summary", "body",
];

const WEEKDAYS: &[&str] = &[
    "mon", "tue", "wed", "thu", "fri", "sat", "sun", "montag", "dienstag", "mittwoch",
    "donnerstag", "freitag", "samstag", "sonntag",
];

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}\.\d{1,2}").expect("date pattern compiles"));

/// Extracted information from a rendered page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Cleaned text, one logical block per line
    pub text: String,

    /// Raw `href` values in document order, duplicates removed
    pub links: Vec<String>,

    /// URL relative links resolve against (`<base href>` or the page URL)
    pub base_url: Url,
}

/// Strips non-content markup from HTML and yields text plus links
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    boilerplate_markers: Vec<String>,
    min_text_chars: usize,
    drop_structured_lines: bool,
}

impl ContentExtractor {
    pub fn from_config(config: &ExtractConfig) -> Self {
        Self {
            boilerplate_markers: config
                .boilerplate_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            min_text_chars: config.min_text_chars,
            drop_structured_lines: config.drop_structured_lines,
        }
    }

    /// Extracts text and outbound links from a rendered document
    ///
    /// Links are captured from the full document, boilerplate regions
    /// included, so navigation menus still drive discovery even though their
    /// text never reaches the output.
    ///
    /// # Example
    ///
    /// ```
    /// use site2pdf::config::ExtractConfig;
    /// use site2pdf::crawler::ContentExtractor;
    /// use url::Url;
    ///
    /// let extractor = ContentExtractor::from_config(&ExtractConfig::default());
    /// let html = r#"<nav><a href="/about">Menu</a></nav><p>Hello world test content here</p>"#;
    /// let page = extractor.extract(html, &Url::parse("https://example.com/").unwrap());
    ///
    /// assert_eq!(page.text, "Hello world test content here");
    /// assert_eq!(page.links, vec!["/about".to_string()]);
    /// ```
    pub fn extract(&self, html: &str, page_url: &Url) -> ExtractedPage {
        let document = Html::parse_document(html);

        let mut raw = String::new();
        self.collect_text(document.root_element(), &mut raw);

        ExtractedPage {
            title: extract_title(&document),
            text: self.clean_lines(&raw),
            links: extract_links(&document),
            base_url: extract_base_url(&document, page_url),
        }
    }

    /// Returns true when the text is too short to deserve a PDF
    pub fn is_low_value(&self, text: &str) -> bool {
        text.chars().count() < self.min_text_chars
    }

    fn collect_text(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    // Source line breaks are layout, not structure
                    out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
                }
                Node::Element(el) => {
                    let name = el.name();
                    if SKIPPED_TAGS.contains(&name) || self.is_boilerplate_block(el) {
                        continue;
                    }
                    let Some(child_element) = ElementRef::wrap(child) else {
                        continue;
                    };

                    let block = BLOCK_TAGS.contains(&name);
                    if block {
                        out.push('\n');
                    }
                    self.collect_text(child_element, out);
                    if block {
                        out.push('\n');
                    }
                }
                // Comments, doctypes and processing instructions carry no text
                _ => {}
            }
        }
    }

    fn is_boilerplate_block(&self, el: &Element) -> bool {
        if !matches!(el.name(), "div" | "section") {
            return false;
        }

        let class = el.attr("class").unwrap_or_default().to_lowercase();
        let id = el.attr("id").unwrap_or_default().to_lowercase();
        self.boilerplate_markers
            .iter()
            .any(|marker| class.contains(marker.as_str()) || id.contains(marker.as_str()))
    }

    fn clean_lines(&self, raw: &str) -> String {
        raw.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .filter(|line| !self.drop_structured_lines || !is_structured_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Lines that look like timetables, date lists or key/value dumps
fn is_structured_line(line: &str) -> bool {
    if line.matches(':').count() > 5 {
        return true;
    }
    if DATE_PATTERN.find_iter(line).count() > 5 {
        return true;
    }

    let lower = line.to_lowercase();
    let weekdays = lower
        .split_whitespace()
        .filter(|word| WEEKDAYS.contains(word))
        .count();
    weekdays > 3
}

/// Returns true when a document has neither visible text nor links
///
/// Used to detect a DOM that was read before client-side rendering produced
/// anything. Inline bootstrap scripts and styles of an application shell do
/// not count as text.
pub fn is_empty_document(html: &str) -> bool {
    if html.trim().is_empty() {
        return true;
    }

    let document = Html::parse_document(html);
    let has_text = document.root_element().descendants().any(|node| {
        let Node::Text(text) = node.value() else {
            return false;
        };
        !text.trim().is_empty()
            && !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
            })
    });
    let has_links = Selector::parse("a[href]")
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false);

    !has_text && !has_links
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
}

/// Collects every `a[href]` value in document order
///
/// Resolution and scope checks happen later; only empty hrefs and explicit
/// download links are dropped here.
fn extract_links(document: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() {
            continue;
        }
        if seen.insert(href.to_string()) {
            links.push(href.to_string());
        }
    }

    links
}

fn extract_base_url(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|base| base.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}
