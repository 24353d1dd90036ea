//! Output PDF writing.
//!
//! This module provides safe PDF writing with:
//! - Output path derivation (`<dir>/<dir name>.pdf`)
//! - Conflict detection (never replace a differently-cased file or a link)
//! - Atomic writes (write to a temp file in the same directory, then rename)
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::io::writer::{PdfWriter, output_path_for};
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let output = output_path_for(Path::new("/scans/photos"))?;
//! let writer = PdfWriter::new();
//! writer.check_target(&output).await?;
//! writer.save(doc, &output).await?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use lopdf::Document;
use tokio::task;
use tracing::debug;

use crate::error::{DirPdfError, Result};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { atomic: true }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to serialize and write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Derive the output path for a directory: `<directory>/<basename>.pdf`.
///
/// # Errors
///
/// Returns [`DirPdfError::InvalidConfig`] if the directory has no final
/// component (for example `/`).
///
/// # Examples
///
/// ```
/// use dirpdf::io::writer::output_path_for;
/// use std::path::Path;
///
/// let output = output_path_for(Path::new("/scans/photos")).unwrap();
/// assert_eq!(output, Path::new("/scans/photos/photos.pdf"));
/// ```
pub fn output_path_for(directory: &Path) -> Result<PathBuf> {
    let base = directory.file_name().ok_or_else(|| {
        DirPdfError::invalid_config(format!(
            "Cannot derive an output name from {}",
            directory.display()
        ))
    })?;

    let mut name = base.to_os_string();
    name.push(".pdf");
    Ok(directory.join(name))
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self::with_options(WriteOptions { atomic: false })
    }

    /// Check that writing `path` would only ever replace `path` itself.
    ///
    /// Overwriting an existing regular file at exactly `path` is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`DirPdfError::OutputConflict`] if:
    /// - `path` is a symlink or not a regular file
    /// - the parent directory holds a name equal to the target's ignoring
    ///   ASCII case but not identical to it
    pub async fn check_target(&self, path: &Path) -> Result<()> {
        if let Ok(metadata) = tokio::fs::symlink_metadata(path).await
            && !metadata.file_type().is_file()
        {
            return Err(DirPdfError::OutputConflict {
                path: path.to_path_buf(),
                existing: path.to_path_buf(),
            });
        }

        let (Some(parent), Some(target_name)) = (path.parent(), path.file_name()) else {
            return Ok(());
        };
        let target_bytes = target_name.as_encoded_bytes();

        let mut entries = tokio::fs::read_dir(parent)
            .await
            .map_err(|source| DirPdfError::FailedToCreateOutput {
                path: path.to_path_buf(),
                source,
            })?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let bytes = name.as_encoded_bytes();
            if bytes != target_bytes && bytes.eq_ignore_ascii_case(target_bytes) {
                return Err(DirPdfError::OutputConflict {
                    path: path.to_path_buf(),
                    existing: entry.path(),
                });
            }
        }

        Ok(())
    }

    /// Serialize `document` and write it to `path`.
    ///
    /// With atomic writes the bytes land in a temporary file next to the
    /// target, which is then renamed over it, so a crash never leaves a
    /// partial output behind.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document cannot be serialized
    /// - The output or temporary file cannot be created
    /// - The write or rename fails
    pub async fn save(&self, mut document: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            let mut bytes = Vec::new();
            document
                .save_to(&mut bytes)
                .map_err(|e| DirPdfError::serialization_failed(e.to_string()))?;

            if options.atomic {
                write_atomic(&path_buf, &bytes)?;
            } else {
                std::fs::write(&path_buf, &bytes).map_err(|e| DirPdfError::FailedToWrite {
                    path: path_buf.clone(),
                    source: e,
                })?;
            }

            Ok::<_, DirPdfError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| DirPdfError::other(format!("Write task failed: {e}")))??;

        debug!(
            path = %stats.output_path.display(),
            bytes = stats.file_size,
            elapsed_ms = stats.write_time.as_millis() as u64,
            "wrote output"
        );

        Ok(stats)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".dirpdf-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| DirPdfError::FailedToCreateOutput {
            path: path.to_path_buf(),
            source: e,
        })?;

    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| DirPdfError::FailedToWrite {
            path: temp.path().to_path_buf(),
            source: e,
        })?;

    // Temp files are created owner-only; published output should not be.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)
            .map(|m| m.permissions().mode())
            .unwrap_or(0o644);
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(mode)).map_err(
            |e| DirPdfError::FailedToWrite {
                path: temp.path().to_path_buf(),
                source: e,
            },
        )?;
    }

    temp.persist(path).map_err(|e| DirPdfError::FailedToWrite {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Format file size as human-readable string.
fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
