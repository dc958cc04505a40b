//! Page title extraction

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};

/// Markers separating a title from site names and taglines, checked in order.
///
/// `&nbsp;-` appears raw in `<title>` tags; parsed attribute values carry the
/// decoded no-break space instead.
const SEPARATORS: &[&str] = &[" |", " \u{2014}", " - ", "&nbsp;-", "\u{a0}-"];

/// Title-bearing `<meta>` tags in priority order, as the attributes naming
/// the tag and the expected name.
const META_TITLES: &[(&[&str], &str)] = &[
    (&["itemprop"], "name"),
    (&["property", "name"], "og:title"),
    (&["name", "property"], "twitter:title"),
];

fn meta_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("meta[content]").unwrap())
}

fn title_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").unwrap())
}

/// Return the first participating capture group of the first pattern that
/// matches `content`.
///
/// Patterns may offer alternatives in separate groups, such as one group per
/// quoting style: `content="([^"]+)"|content='([^']+)'`.
pub fn first_match<'c>(content: &'c str, patterns: &[Regex]) -> Option<&'c str> {
    patterns
        .iter()
        .find_map(|re| re.captures(content))
        .and_then(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str())
}

/// Find the page title: microdata name, then OpenGraph, then Twitter card,
/// then the `<title>` tag. The result is cleaned with [`clean_title`].
pub fn extract_title(content: &str) -> Option<String> {
    document_title(&Html::parse_document(content), content)
}

/// [`extract_title`] over an already parsed `document` of `content`.
pub(crate) fn document_title(document: &Html, content: &str) -> Option<String> {
    META_TITLES
        .iter()
        .find_map(|(attrs, name)| meta_content(document, attrs, name))
        .or_else(|| first_match(content, std::slice::from_ref(title_tag())))
        .map(clean_title)
        .filter(|t| !t.is_empty())
}

/// Content of the first non-blank `<meta>` tag whose `attrs` name it `name`.
fn meta_content<'a>(document: &'a Html, attrs: &[&str], name: &str) -> Option<&'a str> {
    document.select(meta_selector()).find_map(|element| {
        let el = element.value();
        let named = attrs
            .iter()
            .filter_map(|attr| el.attr(attr))
            .any(|value| value.trim().eq_ignore_ascii_case(name));
        if !named {
            return None;
        }
        el.attr("content").filter(|content| !content.trim().is_empty())
    })
}

/// Strip a trailing site name or tagline from a title.
///
/// # Example
/// ```
/// use imgpick::clean_title;
///
/// assert_eq!(clean_title("Big Movie | SiteName"), "Big Movie");
/// assert_eq!(clean_title("Show - Episode 1"), "Show");
/// ```
pub fn clean_title(title: &str) -> String {
    let head = SEPARATORS
        .iter()
        .find_map(|sep| title.find(sep).map(|idx| &title[..idx]))
        .unwrap_or(title);
    head.trim().to_string()
}
