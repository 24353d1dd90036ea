//! Input discovery and ordering.
//!
//! A run considers the regular files directly inside one directory whose
//! extension is one of `png`, `jpg`, `jpeg`, `gif` (images) or `pdf`
//! (documents). Extensions match ASCII case-insensitively. Entries are
//! ordered by the raw bytes of their file names, which gives the same order
//! on every platform and filesystem (`B.png` sorts before `a.png`).
//!
//! Hidden files (names starting with `.`) are ignored, as is the run's own
//! output file.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{DirPdfError, Result};

const IMAGE_PATTERN: &str = "*.{png,jpg,jpeg,gif}";
const DOCUMENT_PATTERN: &str = "*.pdf";

/// How an input is turned into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A raster image that becomes exactly one page.
    Image,
    /// A PDF whose pages are copied in order.
    Document,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Document => write!(f, "pdf"),
        }
    }
}

/// One selected input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEntry {
    /// Path of the file inside the selected directory.
    pub path: PathBuf,
    /// Classification resolved from the extension.
    pub kind: InputKind,
    /// Zero-based position in the sorted listing.
    pub order: usize,
}

impl InputEntry {
    /// File name for display.
    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(OsStr::to_string_lossy)
            .unwrap_or_else(|| self.path.to_string_lossy())
    }
}

/// Lists and classifies the inputs of a directory.
#[derive(Debug, Clone)]
pub struct FileSelector {
    patterns: GlobSet,
    excluded: Option<OsString>,
}

impl FileSelector {
    /// Create a selector for the fixed image and document extensions.
    pub fn new() -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        // Index 0 is images, index 1 is documents.
        for pattern in [IMAGE_PATTERN, DOCUMENT_PATTERN] {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| DirPdfError::other(format!("invalid pattern {pattern}: {e}")))?;
            builder.add(glob);
        }

        let patterns = builder
            .build()
            .map_err(|e| DirPdfError::other(format!("failed to build patterns: {e}")))?;

        Ok(Self {
            patterns,
            excluded: None,
        })
    }

    /// Skip a file with exactly this name.
    pub fn excluding(mut self, file_name: impl Into<OsString>) -> Self {
        self.excluded = Some(file_name.into());
        self
    }

    /// Classify a file name, or `None` if it is not an input.
    pub fn classify(&self, file_name: &OsStr) -> Option<InputKind> {
        if file_name.as_encoded_bytes().starts_with(b".") {
            return None;
        }
        if self.excluded.as_deref() == Some(file_name) {
            return None;
        }

        match self.patterns.matches(Path::new(file_name)).first().copied() {
            Some(0) => Some(InputKind::Image),
            Some(_) => Some(InputKind::Document),
            None => None,
        }
    }

    /// List the inputs of `directory` in page order.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DirPdfError::NotADirectory`] or
    /// [`DirPdfError::SelectionFailed`] if the directory itself cannot be
    /// read. Unreadable children are skipped.
    pub fn select(&self, directory: &Path) -> Result<Vec<InputEntry>> {
        let metadata = std::fs::metadata(directory)
            .map_err(|e| DirPdfError::selection_failed(directory.to_path_buf(), e))?;
        if !metadata.is_dir() {
            return Err(DirPdfError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }

        let mut selected = Vec::new();

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(DirPdfError::selection_failed(
                        directory.to_path_buf(),
                        io::Error::from(err),
                    ));
                }
                Err(err) => {
                    debug!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(kind) = self.classify(entry.file_name()) {
                selected.push((entry.into_path(), kind));
            }
        }

        selected.sort_by(|(a, _), (b, _)| name_bytes(a).cmp(name_bytes(b)));

        let entries: Vec<InputEntry> = selected
            .into_iter()
            .enumerate()
            .map(|(order, (path, kind))| InputEntry { path, kind, order })
            .collect();

        debug!(
            directory = %directory.display(),
            count = entries.len(),
            "selected inputs"
        );

        Ok(entries)
    }
}

fn name_bytes(path: &Path) -> &[u8] {
    path.file_name()
        .map(OsStr::as_encoded_bytes)
        .unwrap_or_default()
}
