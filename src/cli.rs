//! CLI argument parsing for dirpdf.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let config = cli.to_config().expect("Invalid configuration");
//! println!("Merging {}", config.directory.display());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{CompressionLevel, Config, DEFAULT_JPEG_QUALITY};
use crate::error::{DirPdfError, Result};
use crate::raster::Scale;

/// Merge the images and PDFs of a directory into a single PDF.
///
/// dirpdf collects every png, jpg, jpeg, gif and pdf file directly inside
/// DIRECTORY, sorts them by file name and writes DIRECTORY/<name>.pdf.
/// Each image becomes one page sized to the (scaled) image; each PDF
/// contributes all of its pages in order.
#[derive(Parser, Debug)]
#[command(name = "dirpdf")]
#[command(version)]
#[command(about = "Merge the images and PDFs of a directory into a single PDF", long_about = None)]
#[command(author)]
pub struct Cli {
    /// Directory to merge
    ///
    /// Defaults to the current working directory. The output is written
    /// inside it, named after the directory itself.
    ///
    /// Examples:
    ///   dirpdf photos          # writes photos/photos.pdf
    ///   dirpdf -s 0.5 scans    # halves every image
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Scale factor applied to every image
    ///
    /// Page width and height are floor(image size * SCALE), at least 1.
    /// PDF inputs are never rescaled.
    #[arg(short, long, value_name = "SCALE", default_value = "1.0")]
    pub scale: Scale,

    /// Verbose output - show progress for each file
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run - list what would be merged without creating output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Abort on the first file that cannot be merged
    ///
    /// By default, unreadable or corrupt files are skipped with a warning
    /// and the rest of the directory is still merged.
    #[arg(long)]
    pub strict: bool,

    /// Number of files prepared concurrently
    ///
    /// Default is number of CPU cores. Page order never depends on it.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Compression level for output PDF
    ///
    /// - none: Write content streams as they are
    /// - standard: Flate-compress non-image streams (default)
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard"])]
    pub compression: String,

    /// JPEG quality used when re-encoding images (1-100)
    #[arg(long, value_name = "Q", default_value_t = DEFAULT_JPEG_QUALITY)]
    pub quality: u8,

    /// Print a JSON run report on stdout instead of console messages
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is invalid
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        self.validate()?;

        let compression = CompressionLevel::from_str(&self.compression)?;

        let config = Config {
            scale: self.scale,
            // JSON mode keeps stdout for the report
            verbose: self.verbose && !self.json,
            quiet: self.quiet || self.json,
            dry_run: self.dry_run,
            strict: self.strict,
            jobs: self.jobs,
            compression,
            jpeg_quality: self.quality,
            ..Config::new(self.directory.clone().unwrap_or_else(|| PathBuf::from(".")))
        };

        config.validate().map_err(|e| {
            DirPdfError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(DirPdfError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if !(1..=100).contains(&self.quality) {
            return Err(DirPdfError::invalid_config(format!(
                "Invalid quality: {}. Must be between 1 and 100",
                self.quality
            )));
        }

        if !["none", "standard"].contains(&self.compression.as_str()) {
            return Err(DirPdfError::invalid_config(format!(
                "Invalid compression level: {}",
                self.compression
            )));
        }

        Ok(())
    }
}
