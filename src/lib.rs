//! # imgpick
//!
//! Pick the image that best represents a web page, and detect the page's
//! primary media (such as a video) from nothing but its address.
//!
//! ## Features
//!
//! - Discover image candidates from `<img>` tags and known video links
//! - Detect videos described by microdata, JSON-LD or OpenGraph
//! - Extract and clean the page title
//! - Measure candidates concurrently under a fixed worker count and deadline
//! - Choose the largest image with a sensible aspect ratio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> imgpick::Result<()> {
//!     let result = imgpick::detect_media("https://example.org/article", true).await?;
//!
//!     println!("Title: {:?}", result.title);
//!     println!("Best image: {:?}", result.best_image);
//!     println!("Media: {:?} ({:?})", result.media_url, result.media_type);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Extracting From Local HTML
//!
//! ```rust
//! use url::Url;
//! use imgpick::Extraction;
//!
//! let base = Url::parse("https://example.com/post/").unwrap();
//! let html = r#"<title>Hello | Blog</title><img src="cover.jpg">"#;
//! let found = Extraction::from_html(html, &base);
//! assert_eq!(found.title, Some("Hello".to_string()));
//! assert_eq!(found.candidates, vec!["https://example.com/post/cover.jpg"]);
//! ```
//!
//! ## Without HTTP (extraction only)
//!
//! If you already have the markup, disable the default `http` feature:
//!
//! ```toml
//! [dependencies]
//! imgpick = { version = "0.2", default-features = false }
//! ```

mod candidates;
mod error;
mod metadata;
mod microdata;
mod opengraph;
mod resolve;
mod schema_org;
mod select;
mod title;
mod video;

#[cfg(feature = "http")]
mod finder;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
mod probe;

pub use candidates::{Extraction, MediaType};
pub use error::{Error, Result};
pub use metadata::MetadataItem;
pub use resolve::resolve;
pub use select::{DimensionedCandidate, SelectionRules, select};
pub use title::{clean_title, extract_title, first_match};

#[cfg(feature = "http")]
pub use finder::{ExtractionResult, FinderOptions, MediaFinder, placeholder};
#[cfg(feature = "http")]
pub use http::HttpOptions;
#[cfg(feature = "http")]
pub use probe::{ProbeOptions, ProbeReport, decode, dimensions};

/// Extract candidates, media and title of a page without measuring images.
///
/// Uses default options. See [`MediaFinder`] for configuration.
#[cfg(feature = "http")]
pub async fn extract_media(page_url: &str) -> Result<ExtractionResult> {
    MediaFinder::new()?.extract_media(page_url).await
}

/// Run the full pipeline; with `select_best = false` this is
/// [`extract_media`].
#[cfg(feature = "http")]
pub async fn detect_media(page_url: &str, select_best: bool) -> Result<ExtractionResult> {
    MediaFinder::new()?.detect_media(page_url, select_best).await
}

/// Decode the best image of a page, or a blank placeholder if none qualifies.
#[cfg(feature = "http")]
pub async fn pick_image(page_url: &str) -> Result<image::DynamicImage> {
    MediaFinder::new()?.pick_image(page_url).await
}
