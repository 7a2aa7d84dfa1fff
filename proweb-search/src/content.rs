//! HTML content extraction: boilerplate stripping and structured fields.
//!
//! Parses raw HTML, removes non-content elements (scripts, styles,
//! navigation, footers), finds the main content area, and collects
//! headings, Open Graph metadata, links, and images as requested by an
//! [`ExtractMode`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::http::Fetcher;
use crate::types::{Image, Link, PageContent};

/// Maximum characters kept from the main text.
pub const MAX_TEXT_CHARS: usize = 3000;

const MAX_HEADINGS: usize = 5;
const LINK_SCAN_LIMIT: usize = 30;
const MAX_LINKS: usize = 20;
const MAX_LINK_TEXT_CHARS: usize = 80;
const MAX_URL_CHARS: usize = 200;
const IMAGE_SCAN_LIMIT: usize = 10;
const MAX_ALT_CHARS: usize = 100;

/// Probed in order; the first with non-empty text wins.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", ".content", "#content"];

/// Removed with their content before anything else is read.
const BOILERPLATE_TAGS: &[&str] = &["script", "style", "nav", "footer"];

/// Link text containing any of these is page chrome, not content.
const CHROME_KEYWORDS: &[&str] = &["menu", "nav", "toggle", "close"];

/// Which parts of a page to extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Everything.
    #[default]
    Smart,
    /// Main text and headings.
    Text,
    /// Links only.
    Links,
    /// Images only.
    Images,
    /// Open Graph metadata only.
    Metadata,
    /// Everything.
    All,
}

impl ExtractMode {
    /// Resolve this mode into per-field flags.
    pub fn fields(self) -> ExtractFields {
        match self {
            Self::Smart | Self::All => ExtractFields {
                text: true,
                metadata: true,
                links: true,
                images: true,
            },
            Self::Text => ExtractFields {
                text: true,
                ..ExtractFields::NONE
            },
            Self::Links => ExtractFields {
                links: true,
                ..ExtractFields::NONE
            },
            Self::Images => ExtractFields {
                images: true,
                ..ExtractFields::NONE
            },
            Self::Metadata => ExtractFields {
                metadata: true,
                ..ExtractFields::NONE
            },
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Text => "text",
            Self::Links => "links",
            Self::Images => "images",
            Self::Metadata => "metadata",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExtractMode {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smart" => Ok(Self::Smart),
            "text" => Ok(Self::Text),
            "links" => Ok(Self::Links),
            "images" => Ok(Self::Images),
            "metadata" => Ok(Self::Metadata),
            "all" => Ok(Self::All),
            other => Err(SearchError::Config(format!("unknown extract mode: {other}"))),
        }
    }
}

/// Field selection resolved from an [`ExtractMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractFields {
    /// Main text, text length, and headings.
    pub text: bool,
    pub metadata: bool,
    pub links: bool,
    pub images: bool,
}

impl ExtractFields {
    const NONE: Self = Self {
        text: false,
        metadata: false,
        links: false,
        images: false,
    };
}

/// Extract structured content from an HTML document.
///
/// Never fails: a document with nothing recognisable produces a record
/// with an empty title and whatever text the whole document yields.
pub fn extract(html: &str, url: &str, mode: ExtractMode) -> PageContent {
    let fields = mode.fields();
    let cleaned_html = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned_html);

    let mut page = PageContent {
        url: url.to_owned(),
        title: extract_title(&document),
        text: None,
        text_length: None,
        headings: Vec::new(),
        metadata: BTreeMap::new(),
        links: Vec::new(),
        link_count: 0,
        images: Vec::new(),
        image_count: 0,
        scraped_at: Utc::now(),
    };

    if fields.text {
        let text = collapse_whitespace(&extract_main_text(&document));
        page.text_length = Some(text.chars().count());
        page.text = Some(truncate_chars(&text, MAX_TEXT_CHARS));
        page.headings = extract_headings(&document);
    }
    if fields.metadata {
        page.metadata = extract_metadata(&document);
    }
    if fields.links {
        let links = extract_links(&document);
        page.link_count = links.len();
        page.links = links.into_iter().take(MAX_LINKS).collect();
    }
    if fields.images {
        page.images = extract_images(&document);
        page.image_count = page.images.len();
    }

    tracing::debug!(
        url,
        %mode,
        text_length = page.text_length.unwrap_or(0),
        links = page.link_count,
        images = page.image_count,
        "page extracted"
    );
    page
}

/// Fetch `url` and run [`extract`] on the body.
///
/// # Errors
///
/// Returns [`SearchError::Transport`] if the page cannot be fetched.
pub async fn fetch_and_extract(
    fetcher: &Fetcher,
    url: &str,
    mode: ExtractMode,
    timeout: Duration,
) -> Result<PageContent> {
    let html = fetcher.fetch_text(url, timeout).await?;
    Ok(extract(&html, url, mode))
}

/// Extract the page title from the `<title>` element.
fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Text of the first non-empty content region, else the whole document.
fn extract_main_text(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(text) = document
            .select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty())
        {
            return text;
        }
    }

    element_text(document.root_element())
}

fn extract_headings(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("h1, h2, h3") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .take(MAX_HEADINGS)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let Ok(selector) = Selector::parse("meta[property]") else {
        return BTreeMap::new();
    };
    document
        .select(&selector)
        .filter_map(|el| {
            let key = el.value().attr("property")?.strip_prefix("og:")?;
            let content = el.value().attr("content").unwrap_or_default();
            Some((key.to_owned(), content.to_owned()))
        })
        .collect()
}

fn extract_links(document: &Html) -> Vec<Link> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .take(LINK_SCAN_LIMIT)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            let text = element_text(el);
            if href.is_empty() || text.chars().count() <= 2 || is_chrome_text(&text) {
                return None;
            }
            Some(Link {
                text: truncate_chars(&text, MAX_LINK_TEXT_CHARS),
                href: truncate_chars(href, MAX_URL_CHARS),
            })
        })
        .collect()
}

fn extract_images(document: &Html) -> Vec<Image> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .take(IMAGE_SCAN_LIMIT)
        .filter_map(|el| {
            let src = el.value().attr("src").unwrap_or_default().trim();
            let alt = el.value().attr("alt").unwrap_or_default().trim();
            if src.is_empty() || (alt.is_empty() && src.chars().count() <= 10) {
                return None;
            }
            Some(Image {
                src: truncate_chars(src, MAX_URL_CHARS),
                alt: truncate_chars(alt, MAX_ALT_CHARS),
            })
        })
        .collect()
}

fn is_chrome_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    CHROME_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Trimmed text nodes of an element joined by single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove boilerplate HTML tags and their content before parsing.
fn strip_boilerplate_tags(html: &str) -> String {
    let mut result = html.to_owned();
    for tag in BOILERPLATE_TAGS {
        result = strip_tag(&result, tag);
    }
    result
}

/// Remove all instances of a specific HTML tag and its content.
fn strip_tag(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    // ASCII lowering keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut pos = 0;
    loop {
        let start = match lower[pos..].find(&open_tag) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        // Verify this is actually the target tag (not e.g. <navigate> for <nav>).
        let after_tag = start + open_tag.len();
        if after_tag < lower.len() {
            let next_byte = lower.as_bytes()[after_tag];
            if !matches!(next_byte, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t') {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        result.push_str(&html[pos..start]);

        let end = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => {
                // No closing tag: skip to end of the opening tag.
                match lower[start..].find('>') {
                    Some(offset) => start + offset + 1,
                    None => html.len(),
                }
            }
        };

        pos = end;
    }

    result
}

/// Collapse every run of whitespace into one space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_owned(),
        None => text.to_owned(),
    }
}

/// Plain text of an HTML fragment, entities decoded, whitespace collapsed.
pub(crate) fn strip_markup(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    collapse_whitespace(&parsed.root_element().text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smart(html: &str) -> PageContent {
        extract(html, "https://example.com", ExtractMode::Smart)
    }

    #[test]
    fn extract_title_from_html() {
        let html = "<html><head><title> My Page Title </title></head><body>Content</body></html>";
        assert_eq!(smart(html).title, "My Page Title");
    }

    #[test]
    fn extract_title_empty_when_missing() {
        let html = "<html><body>Content here</body></html>";
        assert!(smart(html).title.is_empty());
    }

    #[test]
    fn extract_content_from_article() {
        let html = r#"<html><body>
            <nav>Navigation stuff</nav>
            <article>Article content here</article>
            <footer>Footer stuff</footer>
        </body></html>"#;
        let text = smart(html).text.expect("text selected");
        assert_eq!(text, "Article content here");
    }

    #[test]
    fn selectors_probed_in_order() {
        let html = r#"<html><body>
            <div class="content">Class content</div>
            <main>Main content area</main>
        </body></html>"#;
        assert_eq!(smart(html).text.as_deref(), Some("Main content area"));
    }

    #[test]
    fn content_class_and_id_conventions() {
        let by_class = r#"<html><body><div>Outer</div><div class="content">By class</div></body></html>"#;
        assert_eq!(smart(by_class).text.as_deref(), Some("By class"));

        let by_id = r#"<html><body><div>Outer</div><div id="content">By id</div></body></html>"#;
        assert_eq!(smart(by_id).text.as_deref(), Some("By id"));
    }

    #[test]
    fn empty_article_falls_through_to_next_selector() {
        let html = r#"<html><body><article>   </article><main>Real main</main></body></html>"#;
        assert_eq!(smart(html).text.as_deref(), Some("Real main"));
    }

    #[test]
    fn fallback_to_whole_document_truncated_with_full_length() {
        let body = "word ".repeat(1000);
        let html = format!("<html><body><div>{body}</div></body></html>");
        let page = smart(&html);
        let text = page.text.expect("text selected");
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS);
        assert!(text.starts_with("word word"));
        // 1000 words joined by single spaces.
        assert_eq!(page.text_length, Some(4999));
    }

    #[test]
    fn strip_script_and_style_tags() {
        let html = r#"<html><body>
            <p>Real content</p>
            <script>var x = 1; alert('hi');</script>
            <style>.foo { color: red; }</style>
        </body></html>"#;
        let text = smart(html).text.expect("text selected");
        assert!(text.contains("Real content"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn uppercase_boilerplate_tags_stripped() {
        let html = "<html><body><NAV>Skip</NAV><SCRIPT>evil()</SCRIPT><p>Keep</p></body></html>";
        assert_eq!(smart(html).text.as_deref(), Some("Keep"));
    }

    #[test]
    fn nav_tag_not_confused_with_similar_tags() {
        let html = "<html><body><nav>Skip this</nav><p>Keep this navigate text</p></body></html>";
        let text = smart(html).text.expect("text selected");
        assert!(!text.contains("Skip this"));
        assert!(text.contains("navigate text"));
    }

    #[test]
    fn non_ascii_before_boilerplate_does_not_panic() {
        let html = "<html><body><p>İstanbul ß Ǆ</p><script>x()</script><p>after</p></body></html>";
        let text = smart(html).text.expect("text selected");
        assert!(text.contains("İstanbul"));
        assert!(text.contains("after"));
        assert!(!text.contains("x()"));
    }

    #[test]
    fn whitespace_collapsed() {
        let html = "<html><body><main>Word1    Word2\n\n\n\n\tWord3</main></body></html>";
        assert_eq!(smart(html).text.as_deref(), Some("Word1 Word2 Word3"));
    }

    #[test]
    fn headings_limited_to_five_in_document_order() {
        let html = r#"<html><body>
            <h1>One</h1><h2>Two</h2><h3>Three</h3><h2>Four</h2><h1>Five</h1><h3>Six</h3>
        </body></html>"#;
        assert_eq!(smart(html).headings, vec!["One", "Two", "Three", "Four", "Five"]);
    }

    #[test]
    fn empty_headings_skipped() {
        let html = "<html><body><h1> </h1><h2>Real</h2></body></html>";
        assert_eq!(smart(html).headings, vec!["Real"]);
    }

    #[test]
    fn only_open_graph_metadata_kept() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <meta property="og:image" content="https://example.com/a.png">
            <meta name="description" content="plain description">
            <meta property="twitter:card" content="summary">
        </head><body>x</body></html>"#;
        let metadata = smart(html).metadata;
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["title"], "OG Title");
        assert_eq!(metadata["image"], "https://example.com/a.png");
    }

    #[test]
    fn chrome_links_discarded() {
        let html = r##"<html><body>
            <a href="/docs">Documentation</a>
            <a href="#">Open Menu</a>
            <a href="#">Toggle sidebar</a>
            <a href="#">CLOSE</a>
            <a href="/x">ab</a>
            <a href="">Empty href</a>
            <a href="/guide">The Guide</a>
        </body></html>"##;
        let page = smart(html);
        let texts: Vec<&str> = page.links.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Documentation", "The Guide"]);
        assert_eq!(page.link_count, 2);
    }

    #[test]
    fn links_inside_nav_are_gone() {
        let html = r#"<html><body><nav><a href="/home">Homepage</a></nav><a href="/a">Article link</a></body></html>"#;
        let page = smart(html);
        assert_eq!(page.links.len(), 1);
        assert_eq!(page.links[0].href, "/a");
    }

    #[test]
    fn links_capped_at_twenty() {
        let anchors: String = (0..30)
            .map(|i| format!(r#"<a href="/page/{i}">Page number {i}</a>"#))
            .collect();
        let html = format!("<html><body>{anchors}</body></html>");
        let page = smart(&html);
        assert_eq!(page.links.len(), 20);
        assert_eq!(page.link_count, 30);
    }

    #[test]
    fn only_first_thirty_anchors_scanned() {
        let mut anchors: String = (0..30).map(|_| r#"<a href="/m">Menu</a>"#.to_owned()).collect();
        anchors.push_str(r#"<a href="/late">Late article</a>"#);
        let html = format!("<html><body>{anchors}</body></html>");
        assert!(smart(&html).links.is_empty());
    }

    #[test]
    fn link_text_and_href_truncated() {
        let long_text = "x".repeat(120);
        let long_href = format!("/{}", "p".repeat(300));
        let html = format!(r#"<html><body><a href="{long_href}">{long_text}</a></body></html>"#);
        let page = smart(&html);
        assert_eq!(page.links[0].text.chars().count(), 80);
        assert_eq!(page.links[0].href.chars().count(), 200);
    }

    #[test]
    fn image_filter_requires_alt_or_long_src() {
        let html = r#"<html><body>
            <img src="a.png">
            <img src="b.png" alt="Diagram">
            <img src="https://cdn.example.com/photo.jpg">
            <img alt="no source">
        </body></html>"#;
        let page = smart(html);
        assert_eq!(page.images.len(), 2);
        assert_eq!(page.images[0].alt, "Diagram");
        assert_eq!(page.images[1].src, "https://cdn.example.com/photo.jpg");
        assert_eq!(page.image_count, 2);
    }

    #[test]
    fn only_first_ten_images_scanned() {
        let mut imgs: String = (0..10).map(|_| r#"<img src="x.png">"#.to_owned()).collect();
        imgs.push_str(r#"<img src="late.png" alt="Late">"#);
        let html = format!("<html><body>{imgs}</body></html>");
        assert!(smart(&html).images.is_empty());
    }

    #[test]
    fn text_mode_skips_other_fields() {
        let html = r#"<html><head><meta property="og:title" content="T"></head>
            <body><h1>Head</h1><a href="/a">Some link</a><img src="b.png" alt="B"></body></html>"#;
        let page = extract(html, "https://example.com", ExtractMode::Text);
        assert!(page.text.is_some());
        assert_eq!(page.headings, vec!["Head"]);
        assert!(page.metadata.is_empty());
        assert!(page.links.is_empty());
        assert!(page.images.is_empty());
    }

    #[test]
    fn links_mode_skips_text() {
        let html = r#"<html><body><p>Body</p><a href="/a">Some link</a></body></html>"#;
        let page = extract(html, "https://example.com", ExtractMode::Links);
        assert!(page.text.is_none());
        assert!(page.text_length.is_none());
        assert_eq!(page.links.len(), 1);
    }

    #[test]
    fn mode_resolution() {
        assert_eq!(ExtractMode::Smart.fields(), ExtractMode::All.fields());
        let metadata = ExtractMode::Metadata.fields();
        assert!(metadata.metadata && !metadata.text && !metadata.links && !metadata.images);
        let images = ExtractMode::Images.fields();
        assert!(images.images && !images.text);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("ALL".parse::<ExtractMode>().ok(), Some(ExtractMode::All));
        assert_eq!("metadata".parse::<ExtractMode>().ok(), Some(ExtractMode::Metadata));
        assert!("everything".parse::<ExtractMode>().is_err());
        assert_eq!(ExtractMode::default(), ExtractMode::Smart);
    }

    #[test]
    fn url_preserved_in_output() {
        let page = extract("<p>x</p>", "https://test.example.com/page", ExtractMode::Text);
        assert_eq!(page.url, "https://test.example.com/page");
    }

    #[test]
    fn empty_document_yields_empty_record() {
        let page = smart("");
        assert!(page.title.is_empty());
        assert_eq!(page.text.as_deref(), Some(""));
        assert_eq!(page.text_length, Some(0));
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 3), "ééé");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn strip_markup_removes_tags_and_entities() {
        let fragment = r#"<span class="searchmatch">Rust</span> is a &quot;systems&quot;   language"#;
        assert_eq!(strip_markup(fragment), r#"Rust is a "systems" language"#);
    }

    // ── Fixture-based tests ──────────────────────────────────────────────

    const FIXTURE_COMPLEX: &str = include_str!("../test-data/content_complex.html");

    #[test]
    fn fixture_complex_extracts_title_and_article() {
        let page = extract(FIXTURE_COMPLEX, "https://example.com/article", ExtractMode::All);
        assert_eq!(page.title, "Understanding Rust Ownership - A Deep Dive");
        let text = page.text.expect("text selected");
        assert!(text.starts_with("Understanding Rust Ownership"));
        assert!(text.contains("References and Borrowing"));
        assert!(!text.contains("analytics.track"));
        assert!(!text.contains("Privacy Policy"));
        assert!(!text.contains("Related posts"));
    }

    #[test]
    fn fixture_complex_collects_structure() {
        let page = extract(FIXTURE_COMPLEX, "https://example.com/article", ExtractMode::All);
        assert_eq!(page.headings.first().map(String::as_str), Some("Understanding Rust Ownership"));
        assert_eq!(page.metadata.get("type").map(String::as_str), Some("article"));
        assert!(page.links.iter().any(|l| l.href == "https://doc.rust-lang.org/book/"));
        assert!(page.links.iter().all(|l| !l.text.to_lowercase().contains("menu")));
        assert_eq!(page.images.len(), 1);
        assert_eq!(page.images[0].alt, "Ownership diagram");
    }
}
