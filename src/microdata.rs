//! HTML microdata extraction
//!
//! Reads `itemscope` / `itemtype` / `itemprop` annotations into flat
//! [`MetadataItem`]s. Nested items become items of their own; their
//! properties are not merged into the enclosing item.

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::metadata::{MAX_METADATA_ITEMS, MetadataItem};

fn scope_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("[itemscope]").unwrap())
}

fn prop_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("[itemprop]").unwrap())
}

/// Extract every microdata item in document order.
pub(crate) fn items(document: &Html) -> Vec<MetadataItem> {
    document
        .select(scope_selector())
        .take(MAX_METADATA_ITEMS)
        .map(|scope| {
            let item_type = scope.value().attr("itemtype").unwrap_or_default().trim();
            let mut item = MetadataItem::new(item_type);

            for prop in scope.select(prop_selector()) {
                if prop.value().attr("itemscope").is_some() || !owned_by(prop, scope) {
                    continue;
                }
                let Some(names) = prop.value().attr("itemprop") else {
                    continue;
                };
                let value = property_value(prop);
                for name in names.split_whitespace() {
                    item.insert(name, value.as_str());
                }
            }

            item
        })
        .collect()
}

/// Whether `scope` is the nearest item scope enclosing `prop`.
fn owned_by(prop: ElementRef<'_>, scope: ElementRef<'_>) -> bool {
    prop.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().attr("itemscope").is_some())
        .is_some_and(|el| el.id() == scope.id())
}

fn property_value(prop: ElementRef<'_>) -> String {
    let el = prop.value();
    let attr = match el.name() {
        "meta" => "content",
        "a" | "area" | "link" => "href",
        "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => "src",
        "object" => "data",
        "time" => "datetime",
        "data" | "meter" => "value",
        _ => return prop.text().collect::<String>().trim().to_string(),
    };
    el.attr(attr).unwrap_or_default().trim().to_string()
}
