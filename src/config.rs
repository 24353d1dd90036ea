//! Configuration module for dirpdf.
//!
//! This module holds the validated settings that drive a run:
//! - Which directory to merge and at what image scale
//! - How chatty the console output is
//! - How failures, parallelism, compression and caching behave
//!
//! The CLI builds a [`Config`] from its arguments; library users construct one
//! with [`Config::new`] and adjust fields directly.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::DirPdfError;
use crate::raster::Scale;

/// Maximum number of live entries in the transform cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Time a cached transform stays visible to lookups.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

/// Scale factor applied when none is configured.
pub const DEFAULT_SCALE: f64 = 1.0;

/// JPEG quality used when re-encoding images.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Write content streams as they are.
    None,
    /// Flate-compress non-image streams.
    #[default]
    Standard,
}

impl FromStr for CompressionLevel {
    type Err = DirPdfError;

    /// Parse compression level from string ("none" or "standard").
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            _ => Err(DirPdfError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard"
            ))),
        }
    }
}

/// Settings for the transform cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries. Zero disables caching.
    pub capacity: usize,

    /// Lifetime of an entry after insertion.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Check whether caching is turned off.
    pub fn is_disabled(&self) -> bool {
        self.capacity == 0 || self.ttl.is_zero()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Complete configuration for a directory merge.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose images and PDFs are merged.
    pub directory: PathBuf,

    /// Uniform scale applied to every image.
    pub scale: Scale,

    /// Verbose output mode (per-item progress).
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Dry run mode - report the plan without writing output.
    pub dry_run: bool,

    /// Abort on the first per-item failure instead of skipping it.
    pub strict: bool,

    /// Number of parallel jobs (None = auto-detect).
    pub jobs: Option<usize>,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// JPEG quality for re-encoded images (1-100).
    pub jpeg_quality: u8,

    /// Transform cache settings.
    pub cache: CacheConfig,
}

impl Config {
    /// Create a configuration for `directory` with every other setting at its default.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            scale: Scale::default(),
            verbose: false,
            quiet: false,
            dry_run: false,
            strict: false,
            jobs: None,
            compression: CompressionLevel::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            cache: CacheConfig::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - JPEG quality is outside 1-100
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            bail!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            );
        }

        Ok(())
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
