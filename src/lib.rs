//! dirpdf - Merge a directory's images and PDFs into a single document.
//!
//! Every `png`, `jpg`, `jpeg`, `gif` and `pdf` file directly inside a
//! directory is merged, in file-name order, into `<dir>/<dir name>.pdf`:
//!
//! - Each image becomes one page sized exactly to the (optionally scaled) image
//! - Each PDF contributes all of its pages in their original order
//! - Files that cannot be read or decoded are skipped with a warning
//! - Repeated image transforms are served from a bounded TTL cache
//!
//! # Examples
//!
//! ## Merge a directory
//!
//! ```no_run
//! use dirpdf::config::Config;
//! use dirpdf::pipeline::{RunOutcome, merge_directory};
//! use dirpdf::raster::Scale;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::new("photos");
//! config.scale = Scale::new(0.5)?;
//!
//! match merge_directory(config).await? {
//!     RunOutcome::Written { output, statistics, .. } => {
//!         println!("{} pages -> {}", statistics.total_pages, output.display());
//!     }
//!     other => println!("nothing written: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use dirpdf::raster::{ImageNormalizer, Scale};
//! use dirpdf::select::FileSelector;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let entries = FileSelector::new()?.select(Path::new("photos"))?;
//! let normalizer = ImageNormalizer::new();
//!
//! for entry in &entries {
//!     let bytes = std::fs::read(&entry.path)?;
//!     let image = normalizer.normalize(&bytes, Scale::new(0.25)?)?;
//!     println!("{}: {}x{}", entry.file_name(), image.width, image.height);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod raster;
pub mod select;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::Config;
pub use error::{DirPdfError, Result};
pub use pipeline::{Pipeline, RunOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
