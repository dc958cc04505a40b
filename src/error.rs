//! Error types for imgpick

use thiserror::Error;

/// Errors that abort an extraction.
///
/// Only the page itself can fail an extraction. Problems with individual
/// image candidates are logged and the candidate is dropped.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse or validate the page URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parse error (from url crate)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request failed
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[cfg(feature = "http")]
    #[error("HTTP status {status} for {url}")]
    HttpStatus {
        /// Status code returned by the server
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// Request blocked due to SSRF protection
    #[cfg(feature = "http")]
    #[error("SSRF protection: {0}")]
    SsrfBlocked(String),
}

/// Result type alias for imgpick operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single image candidate produced no dimensions.
#[cfg(feature = "http")]
#[derive(Debug, Error)]
pub(crate) enum CandidateError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] Error),

    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has zero width or height")]
    Empty,
}

#[cfg(feature = "http")]
impl From<Error> for CandidateError {
    fn from(err: Error) -> Self {
        Self::Fetch(err)
    }
}
