//! Schema.org JSON-LD extraction
//!
//! Parses [Schema.org](https://schema.org/) JSON-LD blocks into flat
//! [`MetadataItem`]s. Scalar properties become string properties; nested typed
//! objects (for example the `video` of an `Article`) become items of their own.

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::metadata::{MAX_METADATA_ITEMS, MetadataItem};

fn schema_org_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap())
}

/// Extract items from every JSON-LD block of a document.
pub(crate) fn items(document: &Html) -> Vec<MetadataItem> {
    document
        .select(schema_org_selector())
        .flat_map(|element| parse(&element.text().collect::<String>()))
        .take(MAX_METADATA_ITEMS)
        .collect()
}

/// Parse one JSON-LD string. Invalid JSON yields no items.
pub(crate) fn parse(content: &str) -> Vec<MetadataItem> {
    let Ok(node) = serde_json::from_str::<Value>(content) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    collect(node, &mut items);
    items
}

fn collect(node: Value, items: &mut Vec<MetadataItem>) {
    if items.len() >= MAX_METADATA_ITEMS {
        return;
    }

    match node {
        Value::Array(arr) => arr.into_iter().for_each(|v| collect(v, items)),
        Value::Object(mut obj) => {
            if let Some(Value::Array(graph)) = obj.remove("@graph") {
                graph.into_iter().for_each(|v| collect(v, items));
                return;
            }
            if let Some(schema_type) = schema_type(&obj) {
                flatten(schema_type, obj, items);
            }
        }
        _ => {}
    }
}

fn schema_type(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("@type")? {
        Value::String(s) => Some(s.clone()),
        // Handle multiple types - take the first one
        Value::Array(arr) => arr.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn flatten(schema_type: String, obj: Map<String, Value>, items: &mut Vec<MetadataItem>) {
    let mut item = MetadataItem::new(schema_type);
    let mut nested = Vec::new();

    for (key, value) in obj {
        if key.starts_with('@') {
            continue;
        }
        match value {
            Value::String(s) => item.insert(key, s),
            Value::Number(n) => item.insert(key, n.to_string()),
            Value::Object(_) | Value::Array(_) => nested.push(value),
            Value::Bool(_) | Value::Null => {}
        }
    }

    items.push(item);
    nested.into_iter().for_each(|v| collect(v, items));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object() {
        assert!(parse("{}").is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse("not json").is_empty());
    }

    #[test]
    fn test_single_type() {
        let items = parse(r#"{"@type": "NewsArticle", "headline": "Test", "wordCount": 300}"#);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, "NewsArticle");
        assert_eq!(items[0].get("headline"), Some("Test"));
        assert_eq!(items[0].get("wordCount"), Some("300"));
    }

    #[test]
    fn test_graph_structure() {
        let json = r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "Organization", "name": "Example"},
                {"@type": "WebSite", "url": "https://example.org"}
            ]
        }"#;
        let items = parse(json);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_type, "Organization");
        assert_eq!(items[1].url(), Some("https://example.org"));
    }

    #[test]
    fn test_multiple_types() {
        let items = parse(r#"{"@type": ["VideoObject", "CreativeWork"]}"#);
        assert_eq!(items.len(), 1);
        assert!(items[0].is_video());
    }

    #[test]
    fn test_nested_video() {
        let json = r#"{
            "@type": "Article",
            "headline": "Story",
            "video": {
                "@type": "VideoObject",
                "name": "Interview",
                "embedUrl": "https://player.example.com/e/9",
                "duration": "PT4M"
            }
        }"#;
        let items = parse(json);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("video"), None);
        let video = &items[1];
        assert!(video.is_video());
        assert_eq!(video.title(), Some("Interview"));
        assert_eq!(video.url(), Some("https://player.example.com/e/9"));
        assert_eq!(video.duration(), Some("PT4M"));
    }

    #[test]
    fn test_document_blocks() {
        let html = r#"
            <script type="application/ld+json">{"@type": "WebPage"}</script>
            <script type="application/ld+json">[{"@type": "Person"}, {"name": "untyped"}]</script>
        "#;
        let items = items(&Html::parse_document(html));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].item_type, "Person");
    }
}
