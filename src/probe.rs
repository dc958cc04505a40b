//! Concurrent measurement of image candidates
//!
//! Each candidate is fetched and its header decoded to learn the pixel size.
//! A fixed number of fetches run at once and a single deadline bounds the
//! whole call; whatever has been measured when it fires is returned.

use std::io::Cursor;
use std::time::Duration;

use futures_util::{StreamExt, stream};
use image::{DynamicImage, ImageError, ImageReader};
use reqwest::Client;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, instrument, trace};
use url::Url;

use crate::error::{CandidateError, Error};
use crate::http::{self, HttpOptions};
use crate::select::DimensionedCandidate;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_DEADLINE_MS: u64 = 500;

/// Configuration for dimension probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Number of candidates fetched concurrently. Zero is treated as one.
    pub workers: usize,

    /// Wall-clock budget for the whole probing call
    pub deadline: Duration,

    /// Re-sort measured images into discovery order.
    ///
    /// By default images are reported in completion order.
    pub preserve_order: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            deadline: Duration::from_millis(DEFAULT_DEADLINE_MS),
            preserve_order: false,
        }
    }
}

impl ProbeOptions {
    /// Create probe options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of concurrent fetches.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the overall deadline.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set whether results are re-sorted into discovery order.
    pub fn preserve_order(mut self, preserve: bool) -> Self {
        self.preserve_order = preserve;
        self
    }
}

/// Outcome of a probing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Candidates measured before the deadline
    pub images: Vec<DimensionedCandidate>,

    /// Whether the deadline cut probing short
    pub timed_out: bool,
}

/// Measure `urls`, returning the candidates that could be fetched and decoded.
///
/// Failed candidates are dropped without retry. In-flight fetches are
/// abandoned when the deadline fires.
#[instrument(skip_all, fields(candidates = urls.len(), workers = options.workers))]
pub(crate) async fn probe(
    client: &Client,
    urls: &[String],
    http: &HttpOptions,
    options: &ProbeOptions,
) -> ProbeReport {
    let deadline = Instant::now() + options.deadline;
    let mut pending = stream::iter(urls.iter().enumerate())
        .map(move |(index, url)| async move { (index, measure(client, url, http).await) })
        .buffer_unordered(options.workers.max(1));

    let mut measured = Vec::with_capacity(urls.len());
    let mut outstanding = urls.len();
    let mut timed_out = false;

    while outstanding > 0 {
        match timeout_at(deadline, pending.next()).await {
            Ok(Some((index, result))) => {
                outstanding -= 1;
                match result {
                    Ok(candidate) => {
                        trace!(url = %candidate.url, width = candidate.width, height = candidate.height, "measured image");
                        measured.push((index, candidate));
                    }
                    Err(err) => debug!(url = %urls[index], error = %err, "dropping image candidate"),
                }
            }
            Ok(None) => break,
            Err(_) => {
                timed_out = true;
                debug!(outstanding, "probe deadline reached, returning partial results");
                break;
            }
        }
    }

    if options.preserve_order {
        measured.sort_by_key(|(index, _)| *index);
    }

    ProbeReport {
        images: measured.into_iter().map(|(_, candidate)| candidate).collect(),
        timed_out,
    }
}

async fn measure(
    client: &Client,
    url: &str,
    options: &HttpOptions,
) -> Result<DimensionedCandidate, CandidateError> {
    let parsed = Url::parse(url).map_err(Error::from)?;
    let bytes = http::fetch_bytes(client, &parsed, options).await?;
    let (width, height) = dimensions(&bytes)?;
    if width == 0 || height == 0 {
        return Err(CandidateError::Empty);
    }
    Ok(DimensionedCandidate::new(url, width, height))
}

/// Read the pixel size of encoded image bytes without decoding the pixels.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

/// Fully decode encoded image bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
}

/// Fetch and decode one image.
pub(crate) async fn load(
    client: &Client,
    url: &str,
    options: &HttpOptions,
) -> Result<DynamicImage, CandidateError> {
    let parsed = Url::parse(url).map_err(Error::from)?;
    let bytes = http::fetch_bytes(client, &parsed, options).await?;
    Ok(decode(&bytes)?)
}
