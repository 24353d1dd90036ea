//! Output document assembly.
//!
//! This module provides the core merging functionality with:
//! - Image pages sized exactly to the (scaled) image
//! - PDF page import that keeps the source page order
//! - Bounded concurrent preparation with in-order assembly
//! - Per-item failure isolation
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::cache::TransformCache;
//! use dirpdf::config::{CacheConfig, Config};
//! use dirpdf::merge::{DocumentInfo, Merger};
//! use dirpdf::output::NullSink;
//! use dirpdf::select::FileSelector;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("photos");
//! let entries = FileSelector::new()?.select(Path::new("photos"))?;
//!
//! let cache = Arc::new(TransformCache::new(CacheConfig::default()));
//! let merger = Merger::new(cache, Arc::new(NullSink));
//! let result = merger.merge(&entries, &config, &DocumentInfo::new("photos")).await?;
//! println!("Merged {} pages", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod merger;

pub use builder::{DocumentBuilder, DocumentInfo};
pub use merger::{ItemFailure, MergeResult, MergeStatistics, Merger};
