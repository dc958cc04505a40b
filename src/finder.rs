//! Page-level orchestration: fetch, extract, probe, select

use image::DynamicImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::candidates::{Extraction, MediaType};
use crate::error::Result;
use crate::http::{self, HttpOptions};
use crate::probe::{self, ProbeOptions, ProbeReport};
use crate::select::{DimensionedCandidate, SelectionRules};

const PLACEHOLDER_SIZE: u32 = 50;

/// Media found on a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The page URL as given by the caller
    pub page_url: String,

    /// Cleaned page or video title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Primary media URL, e.g. the canonical video page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Kind of the primary media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,

    /// Duration of the primary media as declared by the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_duration: Option<String>,

    /// Image candidates in discovery order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,

    /// Measured candidates, in completion order unless
    /// [`ProbeOptions::preserve_order`] is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<DimensionedCandidate>,

    /// URL of the selected image, always one of `images`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_image: Option<String>,

    /// Whether the probing deadline returned partial results
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub probe_timed_out: bool,
}

impl ExtractionResult {
    fn new(page_url: &str, extraction: Extraction) -> Self {
        Self {
            page_url: page_url.to_string(),
            title: extraction.title,
            media_url: extraction.media_url,
            media_type: extraction.media_type,
            media_duration: extraction.media_duration,
            candidates: extraction.candidates,
            ..Default::default()
        }
    }
}

/// All configuration of a [`MediaFinder`].
#[derive(Debug, Clone, Default)]
pub struct FinderOptions {
    /// HTTP settings shared by page and image fetches
    pub http: HttpOptions,

    /// Worker count, deadline and ordering of dimension probing
    pub probe: ProbeOptions,

    /// Area and aspect thresholds for the best image
    pub selection: SelectionRules,
}

impl FinderOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP options.
    pub fn http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }

    /// Set the probe options.
    pub fn probe(mut self, probe: ProbeOptions) -> Self {
        self.probe = probe;
        self
    }

    /// Set the selection rules.
    pub fn selection(mut self, selection: SelectionRules) -> Self {
        self.selection = selection;
        self
    }
}

/// Finds the representative image and media of web pages.
///
/// Holds one HTTP client that is reused for every page and image request.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use imgpick::{FinderOptions, MediaFinder, ProbeOptions};
///
/// #[tokio::main]
/// async fn main() -> imgpick::Result<()> {
///     let options = FinderOptions::new()
///         .probe(ProbeOptions::new().deadline(Duration::from_secs(2)));
///     let finder = MediaFinder::with_options(options)?;
///
///     let result = finder.detect_media("https://example.org/article", true).await?;
///     println!("best image: {:?}", result.best_image);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MediaFinder {
    client: Client,
    options: FinderOptions,
}

impl MediaFinder {
    /// Create a finder with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(FinderOptions::default())
    }

    /// Create a finder with custom options.
    pub fn with_options(options: FinderOptions) -> Result<Self> {
        Ok(Self {
            client: options.http.build_client()?,
            options,
        })
    }

    /// The options this finder was built with.
    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Extract candidates, media and title without fetching any image.
    pub async fn extract_media(&self, page_url: &str) -> Result<ExtractionResult> {
        self.detect_media(page_url, false).await
    }

    /// Run the full pipeline.
    ///
    /// With `select_best` the candidates are measured and the best image is
    /// chosen; without it this is the same as [`MediaFinder::extract_media`].
    /// Only an invalid page URL or a failed page fetch is an error.
    #[instrument(skip_all, fields(page_url = %page_url, select_best))]
    pub async fn detect_media(&self, page_url: &str, select_best: bool) -> Result<ExtractionResult> {
        let base = Url::parse(page_url)?;
        let body = http::fetch_page(&self.client, &base, &self.options.http).await?;

        let extraction = Extraction::from_html(&body, &base);
        debug!(
            candidates = extraction.candidates.len(),
            media = extraction.media_url.is_some(),
            "extracted page"
        );

        let mut result = ExtractionResult::new(page_url, extraction);
        if !select_best {
            return Ok(result);
        }

        let report = self.probe(&result.candidates).await;

        result.best_image = self
            .options
            .selection
            .select(&report.images)
            .map(|best| best.url.clone());
        result.images = report.images;
        result.probe_timed_out = report.timed_out;

        Ok(result)
    }

    /// Measure image candidates with this finder's client and probe options.
    pub async fn probe(&self, urls: &[String]) -> ProbeReport {
        probe::probe(&self.client, urls, &self.options.http, &self.options.probe).await
    }

    /// Decode the best image of a page.
    ///
    /// When no image qualifies, or the best one cannot be loaded again, a
    /// blank 50x50 placeholder is returned instead.
    pub async fn pick_image(&self, page_url: &str) -> Result<DynamicImage> {
        let result = self.detect_media(page_url, true).await?;
        let Some(best) = result.best_image else {
            return Ok(placeholder());
        };

        match probe::load(&self.client, &best, &self.options.http).await {
            Ok(image) => Ok(image),
            Err(err) => {
                debug!(url = %best, error = %err, "best image failed to load, using placeholder");
                Ok(placeholder())
            }
        }
    }
}

/// The blank image returned when a page has no suitable image.
pub fn placeholder() -> DynamicImage {
    DynamicImage::new_rgba8(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_omits_empty_fields() {
        let result = ExtractionResult {
            page_url: "http://x.com/".to_string(),
            candidates: vec!["http://x.com/a.jpg".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "page_url": "http://x.com/",
                "candidates": ["http://x.com/a.jpg"]
            })
        );
    }

    #[test]
    fn test_serialization_full_record() {
        let result = ExtractionResult {
            page_url: "http://x.com/".to_string(),
            title: Some("Clip".to_string()),
            media_url: Some("http://x.com/watch/1".to_string()),
            media_type: Some(MediaType::Video),
            images: vec![DimensionedCandidate::new("http://x.com/a.jpg", 200, 150)],
            best_image: Some("http://x.com/a.jpg".to_string()),
            probe_timed_out: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["media_type"], "video");
        assert_eq!(json["images"][0]["width"], 200);
        assert_eq!(json["best_image"], "http://x.com/a.jpg");
        assert_eq!(json["probe_timed_out"], true);

        let back: ExtractionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_placeholder() {
        let image = placeholder();
        assert_eq!((image.width(), image.height()), (50, 50));
    }

    #[tokio::test]
    async fn test_invalid_page_url() {
        let finder = MediaFinder::new().unwrap();
        assert!(matches!(
            finder.extract_media("not a url").await,
            Err(crate::Error::UrlParse(_))
        ));
        assert!(matches!(
            finder.extract_media("mailto:someone@example.com").await,
            Err(crate::Error::InvalidUrl(_))
        ));
    }
}
