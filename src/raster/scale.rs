//! Uniform scale factor and the page geometry derived from it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::DirPdfError;
use crate::raster::NormalizeError;

/// Largest width or height a normalized image may have.
///
/// Baseline JPEG stores dimensions as 16-bit values.
pub const MAX_DIMENSION: u32 = 65_535;

/// Largest pixel count (`width * height`) a normalized image may have.
///
/// Keeps the resize buffers within the decoder's default allocation limit.
pub const MAX_PIXELS: u64 = 40_000_000;

/// Absorbs binary representation error so that `100 * 0.29` floors to 29.
const FLOOR_EPSILON: f64 = 1e-9;

/// Multiplicative factor applied to both image axes before page creation.
///
/// Always finite and strictly positive, which makes bitwise equality a valid
/// equivalence and lets the scale take part in cache keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    /// The identity scale (no resizing).
    pub const IDENTITY: Scale = Scale(1.0);

    /// Create a scale factor.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is not a finite number greater than zero.
    pub fn new(factor: f64) -> Result<Self, DirPdfError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(DirPdfError::invalid_config(format!(
                "Invalid scale: {factor}. Must be a finite number greater than 0"
            )));
        }
        Ok(Self(factor))
    }

    /// Get the raw factor.
    pub fn factor(&self) -> f64 {
        self.0
    }

    /// Check whether this scale leaves dimensions unchanged.
    pub fn is_identity(&self) -> bool {
        self.0 == 1.0
    }

    /// Scale a single dimension: floor of `value * factor`, never below 1.
    ///
    /// Returns `None` when the result does not fit in [`MAX_DIMENSION`].
    fn apply_axis(&self, value: u32) -> Option<u32> {
        let scaled = (f64::from(value) * self.0 + FLOOR_EPSILON).floor().max(1.0);
        (scaled <= f64::from(MAX_DIMENSION)).then_some(scaled as u32)
    }

    /// Compute the target box for an image of intrinsic size `width` x `height`.
    ///
    /// Each axis becomes `floor(dim * factor)`, at least 1. A product within
    /// 1e-9 below an integer rounds up to that integer, so `100 * 0.29`
    /// gives 29 rather than the 28 a literal floor of the binary product
    /// would give. Both axes use the same factor, so the aspect ratio is
    /// preserved to within one pixel of rounding.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Resize`] if either target dimension would
    /// exceed [`MAX_DIMENSION`] or the target would hold more than
    /// [`MAX_PIXELS`] pixels.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirpdf::raster::Scale;
    ///
    /// let half = Scale::new(0.5).unwrap();
    /// assert_eq!(half.target_dimensions(100, 50).unwrap(), (50, 25));
    /// assert_eq!(half.target_dimensions(1, 1).unwrap(), (1, 1));
    /// ```
    pub fn target_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32), NormalizeError> {
        match (self.apply_axis(width), self.apply_axis(height)) {
            (Some(target_width), Some(target_height))
                if u64::from(target_width) * u64::from(target_height) > MAX_PIXELS =>
            {
                Err(NormalizeError::Resize {
                    width,
                    height,
                    reason: format!(
                        "{target_width}x{target_height} exceeds the {MAX_PIXELS} pixel budget"
                    ),
                })
            }
            (Some(target_width), Some(target_height)) => Ok((target_width, target_height)),
            _ => Err(NormalizeError::Resize {
                width,
                height,
                reason: format!(
                    "scaling by {} exceeds the {MAX_DIMENSION} pixel limit",
                    self.0
                ),
            }),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Eq for Scale {}

impl Hash for Scale {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Scale {
    type Err = DirPdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let factor: f64 = s
            .trim()
            .parse()
            .map_err(|_| DirPdfError::invalid_config(format!("Invalid scale: {s}")))?;
        Self::new(factor)
    }
}
