//! OpenGraph metadata extraction
//!
//! Parses [OpenGraph](https://ogp.me/) `<meta property="og:...">` tags into a
//! single [`MetadataItem`] whose type is the `og:type` value.

use std::sync::OnceLock;

use scraper::{Html, Selector};

use crate::metadata::MetadataItem;

// Security limit for repeated og:* tags
const MAX_PROPERTIES: usize = 200;

fn meta_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("meta[content]").unwrap())
}

/// Build the OpenGraph item of a document, if it declares any `og:` tags.
///
/// Property names are stored without the `og:` prefix (`title`, `video:url`).
/// For repeated structured properties such as `og:video` the first value wins.
pub(crate) fn item(document: &Html) -> Option<MetadataItem> {
    let mut item = MetadataItem::default();
    let mut seen = 0;

    for element in document.select(meta_selector()) {
        let el = element.value();
        let Some(property) = el.attr("property").or_else(|| el.attr("name")) else {
            continue;
        };
        let Some(property) = property.trim().strip_prefix("og:") else {
            continue;
        };
        let content = el.attr("content").unwrap_or_default().trim();

        seen += 1;
        if seen > MAX_PROPERTIES {
            break;
        }

        match property {
            "type" if item.item_type.is_empty() => item.item_type = content.to_string(),
            "type" => {}
            _ => item.insert(property, content),
        }
    }

    (seen > 0).then_some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_properties() {
        let html = r#"
            <head>
                <meta property="og:type" content="article">
                <meta property="og:title" content="Test Article">
                <meta property="og:description" content="A test description">
                <meta name="description" content="not opengraph">
            </head>
        "#;
        let og = item(&Html::parse_document(html)).unwrap();

        assert_eq!(og.item_type, "article");
        assert!(!og.is_video());
        assert_eq!(og.get("title"), Some("Test Article"));
        assert_eq!(og.get("description"), Some("A test description"));
        assert_eq!(og.properties.len(), 2);
    }

    #[test]
    fn test_video_properties() {
        let html = r#"
            <head>
                <meta property="og:type" content="video.other">
                <meta property="og:title" content="Clip">
                <meta property="og:video:url" content="https://example.org/embed/1">
                <meta property="og:video:duration" content="93">
                <meta property="og:video:url" content="https://example.org/embed/2">
            </head>
        "#;
        let og = item(&Html::parse_document(html)).unwrap();

        assert!(og.is_video());
        assert_eq!(og.title(), Some("Clip"));
        assert_eq!(og.url(), Some("https://example.org/embed/1"));
        assert_eq!(og.duration(), Some("93"));
    }

    #[test]
    fn test_og_url_precedes_video_url() {
        let html = r#"
            <meta property="og:video" content="https://example.org/embed/1">
            <meta property="og:url" content="https://example.org/watch/1">
        "#;
        let og = item(&Html::parse_document(html)).unwrap();
        assert_eq!(og.url(), Some("https://example.org/watch/1"));
    }

    #[test]
    fn test_no_opengraph() {
        let html = r#"<head><meta name="twitter:title" content="Nope"></head>"#;
        assert!(item(&Html::parse_document(html)).is_none());
    }
}
