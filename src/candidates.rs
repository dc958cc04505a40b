//! Image candidate and media discovery

use std::collections::HashSet;
use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::metadata::{self, MetadataItem};
use crate::resolve::resolve;
use crate::{title, video};

// Security limit to prevent DoS via resource exhaustion
const MAX_CANDIDATES: usize = 1_000;

fn img_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img[src]").unwrap())
}

/// Kind of primary media detected on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A video, e.g. a watch page or player embed
    Video,
}

impl MediaType {
    /// Wire name of the media type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
        }
    }
}

/// Everything found in a page's markup, before any image is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Absolute, de-duplicated image URLs in discovery order
    pub candidates: Vec<String>,

    /// Primary media URL
    pub media_url: Option<String>,

    /// Kind of the primary media
    pub media_type: Option<MediaType>,

    /// Duration of the primary media as declared by the page
    pub media_duration: Option<String>,

    /// Cleaned page title
    pub title: Option<String>,
}

impl Extraction {
    /// Scan page markup for image candidates, primary media and title.
    ///
    /// Never fails: markup that is not HTML simply yields an empty extraction.
    ///
    /// # Example
    /// ```
    /// use url::Url;
    /// use imgpick::Extraction;
    ///
    /// let base = Url::parse("http://x.com/p/").unwrap();
    /// let html = r#"<title>Big Movie | Site</title><img src="img/a.jpg">"#;
    /// let found = Extraction::from_html(html, &base);
    /// assert_eq!(found.candidates, vec!["http://x.com/p/img/a.jpg"]);
    /// assert_eq!(found.title.as_deref(), Some("Big Movie"));
    /// ```
    pub fn from_html(content: &str, base: &Url) -> Self {
        let document = Html::parse_document(content);
        let mut extraction = Self::default();

        if let Some(item) = metadata::collect(&document)
            .into_iter()
            .find(MetadataItem::is_video)
        {
            extraction.set_video(&item, base);
        }

        let mut seen = HashSet::new();
        let thumbnails = video::thumbnails(content);
        let images = document
            .select(img_selector())
            .filter_map(|el| el.value().attr("src"))
            .filter_map(|src| resolve(src, base));

        extraction.candidates = thumbnails
            .into_iter()
            .chain(images)
            .filter(|url| seen.insert(url.clone()))
            .take(MAX_CANDIDATES)
            .collect();

        if extraction.media_url.is_none()
            && let Some(url) = video::official_url(content, base)
        {
            extraction.media_url = Some(url);
            extraction.media_type = Some(MediaType::Video);
        }

        if extraction.title.is_none() {
            extraction.title = title::document_title(&document, content);
        }

        extraction
    }

    fn set_video(&mut self, item: &MetadataItem, base: &Url) {
        self.title = item
            .title()
            .map(title::clean_title)
            .filter(|t| !t.is_empty());
        self.media_url = item
            .url()
            .map(|url| resolve(url, base).unwrap_or_else(|| url.to_string()));
        self.media_type = Some(MediaType::Video);
        self.media_duration = item.duration().map(str::to_string);
    }
}
