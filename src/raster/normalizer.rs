//! Decode, resize and re-encode a single image.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba};
use tracing::debug;

use crate::config::DEFAULT_JPEG_QUALITY;
use crate::raster::{NormalizeError, Scale};

const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// An image ready to be placed on a page.
///
/// `width` and `height` are the post-scale pixel dimensions and therefore the
/// page size. `bytes` is a baseline RGB JPEG stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// Width in pixels after scaling.
    pub width: u32,

    /// Height in pixels after scaling.
    pub height: u32,

    /// Intrinsic width of the decoded source.
    pub source_width: u32,

    /// Intrinsic height of the decoded source.
    pub source_height: u32,

    /// Encoded JPEG payload.
    pub bytes: Vec<u8>,
}

/// Converts raw image bytes into a [`NormalizedImage`].
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    jpeg_quality: u8,
}

impl ImageNormalizer {
    /// Create a normalizer with the default JPEG quality and Lanczos filtering.
    pub fn new() -> Self {
        Self::with_quality(DEFAULT_JPEG_QUALITY)
    }

    /// Create a normalizer with a specific JPEG quality (clamped to 1..=100).
    pub fn with_quality(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// JPEG quality used for re-encoding.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Normalize encoded image bytes.
    ///
    /// # Errors
    ///
    /// - [`NormalizeError::Decode`] if the bytes are not PNG, JPEG or GIF
    /// - [`NormalizeError::Resize`] if the scaled size is out of range
    /// - [`NormalizeError::Encode`] if JPEG encoding fails
    pub fn normalize(&self, bytes: &[u8], scale: Scale) -> Result<NormalizedImage, NormalizeError> {
        let decoded = image::load_from_memory(bytes).map_err(NormalizeError::Decode)?;
        let (source_width, source_height) = (decoded.width(), decoded.height());
        let (width, height) = scale.target_dimensions(source_width, source_height)?;

        let resized = if (width, height) == (source_width, source_height) {
            decoded
        } else {
            // Both targets come from the same factor, so the exact resize
            // stays inside the scaled box without distorting the aspect ratio.
            decoded.resize_exact(width, height, RESIZE_FILTER)
        };

        let rgb = flatten_alpha(resized);
        let bytes = self.encode_jpeg(&rgb)?;

        debug!(
            source_width,
            source_height,
            width,
            height,
            encoded = bytes.len(),
            "normalized image"
        );

        Ok(NormalizedImage {
            width,
            height,
            source_width,
            source_height,
            bytes,
        })
    }

    fn encode_jpeg(&self, rgb: &RgbImage) -> Result<Vec<u8>, NormalizeError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality)
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(NormalizeError::Encode)?;
        Ok(bytes)
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the alpha channel by compositing onto a white background.
fn flatten_alpha(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
