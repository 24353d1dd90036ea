//! Raster image normalization.
//!
//! Every image input goes through the same three steps before it can become
//! a page:
//!
//! 1. decode the file bytes (PNG, JPEG or GIF; GIFs contribute their first
//!    frame),
//! 2. resize by a uniform [`Scale`] when the scale is not the identity,
//! 3. re-encode to baseline RGB JPEG, the one format embedded in the output.
//!
//! The result is a [`NormalizedImage`] whose dimensions are the page size.
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::raster::{ImageNormalizer, Scale};
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let normalizer = ImageNormalizer::new();
//! let image = normalizer.normalize(bytes, Scale::new(0.5)?)?;
//! println!("page will be {}x{}", image.width, image.height);
//! # Ok(())
//! # }
//! ```

pub mod normalizer;
pub mod scale;

pub use normalizer::{ImageNormalizer, NormalizedImage};
pub use scale::{MAX_DIMENSION, MAX_PIXELS, Scale};

/// Failure while turning image bytes into an embeddable payload.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The bytes are not a supported raster format.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The scaled dimensions cannot be produced.
    #[error("failed to resize {width}x{height} image: {reason}")]
    Resize {
        /// Intrinsic width of the source image.
        width: u32,
        /// Intrinsic height of the source image.
        height: u32,
        /// Details about the failure.
        reason: String,
    },

    /// The pixel data could not be re-encoded.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// The decoding task stopped without producing a result.
    #[error("image processing panicked: {0}")]
    Panicked(String),
}
