//! Source file reading.
//!
//! This module provides the read side of a run:
//! - File fingerprints (size and modification time) for cache keys
//! - Raw image bytes
//! - Parsed PDF documents with load statistics
//!
//! Parsing happens on tokio's blocking pool so a large PDF never stalls the
//! runtime.
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::io::reader::SourceReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new();
//! let loaded = reader.load_document(Path::new("scan.pdf")).await?;
//! println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use lopdf::Document;
use tokio::task::JoinError;
use tracing::debug;

use crate::error::{DirPdfError, Result};

/// Identity of a file's contents at the time it was inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileFingerprint {
    /// File size in bytes.
    pub len: u64,
    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
}

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedDocument {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to read and parse the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

/// Reads images and PDFs from disk.
#[derive(Debug, Clone)]
pub struct SourceReader {
    /// Whether to reject documents without pages.
    verify: bool,
}

impl SourceReader {
    /// Create a new reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Inspect a file's size and modification time.
    ///
    /// # Errors
    ///
    /// Returns [`DirPdfError::ReadFailed`] if the metadata cannot be read.
    pub async fn fingerprint(&self, path: &Path) -> Result<FileFingerprint> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| DirPdfError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(FileFingerprint {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    /// Read the raw bytes of an image file.
    ///
    /// # Errors
    ///
    /// Returns [`DirPdfError::ReadFailed`] if the file cannot be read.
    pub async fn read_image(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|source| DirPdfError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages (unless verification is off)
    pub async fn load_document(&self, path: &Path) -> Result<LoadedDocument> {
        let path_buf = path.to_path_buf();
        let start = Instant::now();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DirPdfError::ReadFailed {
                path: path_buf.clone(),
                source,
            })?;
        let file_size = bytes.len() as u64;

        let parse_path = path_buf.clone();
        let document = tokio::task::spawn_blocking(move || {
            Document::load_mem(&bytes).map_err(|e| {
                let err_msg = e.to_string();
                if err_msg.contains("encrypt") || err_msg.contains("password") {
                    DirPdfError::EncryptedDocument {
                        path: parse_path.clone(),
                    }
                } else {
                    DirPdfError::document_load_failed(parse_path.clone(), err_msg)
                }
            })
        })
        .await
        .map_err(|e| document_task_failed(&path_buf, e))??;

        if document.trailer.has(b"Encrypt") {
            return Err(DirPdfError::EncryptedDocument { path: path_buf });
        }

        let page_count = document.get_pages().len();
        if self.verify && page_count == 0 {
            return Err(DirPdfError::EmptyDocument { path: path_buf });
        }

        let load_time = start.elapsed();
        debug!(
            path = %path_buf.display(),
            pages = page_count,
            bytes = file_size,
            elapsed_ms = load_time.as_millis() as u64,
            "loaded document"
        );

        Ok(LoadedDocument {
            document,
            path: path_buf,
            page_count,
            load_time,
            file_size,
        })
    }
}

/// A panicked parse fails only its own document.
fn document_task_failed(path: &Path, err: JoinError) -> DirPdfError {
    DirPdfError::document_load_failed(path.to_path_buf(), format!("parser panicked: {err}"))
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new()
    }
}
