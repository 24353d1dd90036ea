//! I/O operations for dirpdf.
//!
//! This module handles all file I/O:
//! - Reading image bytes and file fingerprints
//! - Loading PDF inputs from disk
//! - Writing the merged PDF next to its inputs
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::io::{PdfWriter, SourceReader, output_path_for};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new();
//! let loaded = reader.load_document(Path::new("photos/scan.pdf")).await?;
//!
//! let output = output_path_for(Path::new("photos"))?;
//! PdfWriter::new().save(loaded.document, &output).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{FileFingerprint, LoadedDocument, SourceReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics, output_path_for};
