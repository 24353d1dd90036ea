//! Error types for dirpdf.
//!
//! Two layers of failure exist in a run:
//!
//! - **Per-item errors** (an image that will not decode, a PDF that will not
//!   parse) are recoverable. The merger records them as diagnostics and moves
//!   on to the next input.
//! - **Run errors** (the directory cannot be read, the output cannot be
//!   written) are fatal and terminate the process with a non-zero exit code.
//!
//! [`DirPdfError::is_recoverable`] and [`DirPdfError::is_fatal`] encode that
//! split so the merger does not have to match on individual variants.

use std::io;
use std::path::PathBuf;

use crate::raster::NormalizeError;

/// Result type alias for dirpdf operations.
pub type Result<T> = std::result::Result<T, DirPdfError>;

/// Main error type for dirpdf operations.
#[derive(Debug, thiserror::Error)]
pub enum DirPdfError {
    /// The input directory could not be listed.
    #[error("Cannot read directory: {}\n  Reason: {source}", .path.display())]
    SelectionFailed {
        /// Directory that was being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The input path exists but is not a directory.
    #[error("Not a directory: {}", .path.display())]
    NotADirectory {
        /// Path that was expected to be a directory.
        path: PathBuf,
    },

    /// An input file could not be read from disk.
    #[error("Cannot read file: {}\n  Reason: {source}", .path.display())]
    ReadFailed {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An image could not be decoded, resized or re-encoded.
    #[error("Failed to process image: {}\n  Reason: {source}", .path.display())]
    ImageFailed {
        /// Path to the image.
        path: PathBuf,
        /// Normalization stage that failed.
        #[source]
        source: NormalizeError,
    },

    /// A PDF input could not be parsed.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    DocumentLoadFailed {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A PDF input is encrypted.
    #[error(
        "PDF is encrypted and cannot be merged: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        .path.display()
    )]
    EncryptedDocument {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// A PDF input parsed but contains no pages.
    #[error("PDF has no pages: {}", .path.display())]
    EmptyDocument {
        /// Path to the PDF file.
        path: PathBuf,
    },

    /// A prepared item could not be added to the output document.
    #[error("Failed to add {} to the output document\n  Reason: {reason}", .path.display())]
    EmbedFailed {
        /// Path to the input whose pages could not be added.
        path: PathBuf,
        /// Details about the failure.
        reason: String,
    },

    /// The assembled document could not be serialized.
    #[error("Failed to serialize output document: {reason}")]
    SerializationFailed {
        /// Details about the failure.
        reason: String,
    },

    /// The output file could not be created.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The output file could not be written.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing the output would replace a different file.
    #[error(
        "Refusing to overwrite {}: it would replace {}\n  \
         Rename or remove the existing file first",
        .path.display(),
        .existing.display()
    )]
    OutputConflict {
        /// Output path dirpdf wants to write.
        path: PathBuf,
        /// The existing entry that would be clobbered.
        existing: PathBuf,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for DirPdfError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl DirPdfError {
    /// Create a SelectionFailed error.
    pub fn selection_failed(path: PathBuf, source: io::Error) -> Self {
        Self::SelectionFailed { path, source }
    }

    /// Create an ImageFailed error.
    pub fn image_failed(path: PathBuf, source: NormalizeError) -> Self {
        Self::ImageFailed { path, source }
    }

    /// Create a DocumentLoadFailed error.
    pub fn document_load_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::DocumentLoadFailed {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EmbedFailed error.
    pub fn embed_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::EmbedFailed {
            path,
            reason: reason.into(),
        }
    }

    /// Create a SerializationFailed error.
    pub fn serialization_failed(reason: impl Into<String>) -> Self {
        Self::SerializationFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Path of the input or output this error concerns, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::SelectionFailed { path, .. }
            | Self::NotADirectory { path }
            | Self::ReadFailed { path, .. }
            | Self::ImageFailed { path, .. }
            | Self::DocumentLoadFailed { path, .. }
            | Self::EncryptedDocument { path }
            | Self::EmptyDocument { path }
            | Self::EmbedFailed { path, .. }
            | Self::FailedToCreateOutput { path, .. }
            | Self::FailedToWrite { path, .. }
            | Self::OutputConflict { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Check if this error is confined to a single input item.
    ///
    /// Recoverable errors are skipped by the merger unless strict mode is on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ReadFailed { .. }
                | Self::ImageFailed { .. }
                | Self::DocumentLoadFailed { .. }
                | Self::EncryptedDocument { .. }
                | Self::EmptyDocument { .. }
                | Self::EmbedFailed { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SelectionFailed { .. } => 2,
            Self::NotADirectory { .. } => 2,
            Self::ReadFailed { .. } => 2,
            Self::ImageFailed { .. } => 3,
            Self::DocumentLoadFailed { .. } => 3,
            Self::EncryptedDocument { .. } => 3,
            Self::EmptyDocument { .. } => 3,
            Self::EmbedFailed { .. } => 6,
            Self::SerializationFailed { .. } => 6,
            Self::OutputConflict { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
