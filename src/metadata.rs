//! Structured metadata items
//!
//! Microdata, JSON-LD and OpenGraph all describe "things" on the page as a
//! type plus a bag of properties. They are flattened into [`MetadataItem`]s
//! so media detection can treat every source the same way.

use std::collections::HashMap;

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::{microdata, opengraph, schema_org};

// Security limit to prevent DoS via resource exhaustion
pub(crate) const MAX_METADATA_ITEMS: usize = 100;

const TITLE_KEYS: &[&str] = &["name", "title", "headline"];
const URL_KEYS: &[&str] = &[
    "url",
    "embedUrl",
    "contentUrl",
    "video",
    "video:url",
    "video:secure_url",
];
const DURATION_KEYS: &[&str] = &["duration", "video:duration"];

/// A typed bag of string properties describing one object on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Declared type (e.g. "https://schema.org/VideoObject", "video.other")
    pub item_type: String,

    /// Properties, first value wins for repeated keys
    pub properties: HashMap<String, String>,
}

impl MetadataItem {
    /// Create an empty item with the given type.
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            properties: HashMap::new(),
        }
    }

    /// Insert a property unless it is already set or blank.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.properties
            .entry(key.into())
            .or_insert_with(|| value.to_string());
    }

    /// Get a property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Whether the declared type denotes a video.
    pub fn is_video(&self) -> bool {
        self.item_type.to_ascii_lowercase().contains("video")
    }

    /// Human readable name of the object.
    pub fn title(&self) -> Option<&str> {
        self.first_of(TITLE_KEYS)
    }

    /// Canonical URL of the object.
    pub fn url(&self) -> Option<&str> {
        self.first_of(URL_KEYS)
    }

    /// Duration, passed through as declared.
    pub fn duration(&self) -> Option<&str> {
        self.first_of(DURATION_KEYS)
    }

    fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }
}

/// Collect metadata items from a parsed document.
///
/// Sources are scanned in a fixed order: microdata, JSON-LD, OpenGraph.
pub fn collect(document: &Html) -> Vec<MetadataItem> {
    microdata::items(document)
        .into_iter()
        .chain(schema_org::items(document))
        .chain(opengraph::item(document))
        .take(MAX_METADATA_ITEMS)
        .collect()
}
