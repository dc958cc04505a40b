//! Best image selection

use serde::{Deserialize, Serialize};

const DEFAULT_MIN_AREA: u64 = 5_000;
const DEFAULT_MIN_ASPECT: f64 = 0.5;
const DEFAULT_MAX_ASPECT: f64 = 2.0;

/// An image candidate whose pixel size has been measured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionedCandidate {
    /// Absolute image URL
    pub url: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl DimensionedCandidate {
    /// Create a measured candidate.
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }

    /// Pixel area.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Width divided by height, `None` for degenerate images.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0).then(|| f64::from(self.width) / f64::from(self.height))
    }
}

/// Thresholds an image must meet to be picked.
///
/// The defaults reject icons and spacers (area below 5000 px²) and banners or
/// rules (aspect ratio outside 0.5..=2.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRules {
    /// Minimum pixel area
    pub min_area: u64,

    /// Minimum width / height ratio
    pub min_aspect: f64,

    /// Maximum width / height ratio
    pub max_aspect: f64,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            min_aspect: DEFAULT_MIN_ASPECT,
            max_aspect: DEFAULT_MAX_ASPECT,
        }
    }
}

impl SelectionRules {
    /// Create rules with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum pixel area.
    pub fn min_area(mut self, area: u64) -> Self {
        self.min_area = area;
        self
    }

    /// Set the accepted aspect ratio band.
    pub fn aspect_range(mut self, min: f64, max: f64) -> Self {
        self.min_aspect = min;
        self.max_aspect = max;
        self
    }

    /// Whether a candidate passes the area and aspect filters.
    pub fn accepts(&self, candidate: &DimensionedCandidate) -> bool {
        let Some(ratio) = candidate.aspect_ratio() else {
            return false;
        };
        candidate.area() >= self.min_area && ratio >= self.min_aspect && ratio <= self.max_aspect
    }

    /// Pick the accepted candidate with the largest area.
    ///
    /// Ties keep the candidate encountered first. `None` means no image on the
    /// page is suitable, which is a normal outcome.
    pub fn select<'a>(&self, candidates: &'a [DimensionedCandidate]) -> Option<&'a DimensionedCandidate> {
        candidates
            .iter()
            .filter(|c| self.accepts(c))
            .fold(None, |best: Option<&DimensionedCandidate>, c| match best {
                Some(b) if b.area() >= c.area() => Some(b),
                _ => Some(c),
            })
    }
}

/// Pick the best image URL with the default [`SelectionRules`].
///
/// # Example
/// ```
/// use imgpick::{DimensionedCandidate, select};
///
/// let images = vec![
///     DimensionedCandidate::new("http://x.com/small.jpg", 100, 80),
///     DimensionedCandidate::new("http://x.com/large.jpg", 200, 150),
/// ];
/// assert_eq!(select(&images), Some("http://x.com/large.jpg"));
/// ```
pub fn select(candidates: &[DimensionedCandidate]) -> Option<&str> {
    SelectionRules::default()
        .select(candidates)
        .map(|c| c.url.as_str())
}
