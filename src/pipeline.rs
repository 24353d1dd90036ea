//! End-to-end run over one directory: select, merge, write.
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::config::Config;
//! use dirpdf::pipeline::{Pipeline, RunOutcome};
//! use dirpdf::output::OutputFormatter;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("photos");
//! let pipeline = Pipeline::new(config, Arc::new(OutputFormatter::default()));
//!
//! if let RunOutcome::Written { output, .. } = pipeline.run().await? {
//!     println!("wrote {}", output.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task;
use tracing::{debug, info};

use crate::cache::TransformCache;
use crate::config::Config;
use crate::error::{DirPdfError, Result};
use crate::io::{PdfWriter, WriteStatistics, output_path_for};
use crate::merge::{DocumentInfo, ItemFailure, MergeStatistics, Merger};
use crate::output::{DiagnosticContext, DiagnosticSink, MessageLevel, NullSink};
use crate::select::{FileSelector, InputEntry};

/// How a run ended. Every variant is a success; failures are `Err`.
#[derive(Debug)]
pub enum RunOutcome {
    /// The directory holds no images or PDFs. Nothing was written.
    NoInputs {
        /// Directory that was scanned.
        directory: PathBuf,
        /// Output path that would have been used.
        output: PathBuf,
    },

    /// Dry run: the inputs that would be merged, in page order.
    DryRun {
        /// Directory that was scanned.
        directory: PathBuf,
        /// Output path that would be written.
        output: PathBuf,
        /// Selected inputs.
        plan: Vec<InputEntry>,
    },

    /// Every input failed. Nothing was written.
    NothingMerged {
        /// Directory that was scanned.
        directory: PathBuf,
        /// Output path that would have been used.
        output: PathBuf,
        /// Merge statistics.
        statistics: MergeStatistics,
        /// Why each input was skipped.
        failures: Vec<ItemFailure>,
    },

    /// The merged document was written.
    Written {
        /// Directory that was scanned.
        directory: PathBuf,
        /// Path of the written PDF.
        output: PathBuf,
        /// Merge statistics.
        statistics: MergeStatistics,
        /// Inputs that were skipped.
        failures: Vec<ItemFailure>,
        /// Write statistics.
        write: WriteStatistics,
    },
}

impl RunOutcome {
    /// The scanned directory.
    pub fn directory(&self) -> &PathBuf {
        match self {
            Self::NoInputs { directory, .. }
            | Self::DryRun { directory, .. }
            | Self::NothingMerged { directory, .. }
            | Self::Written { directory, .. } => directory,
        }
    }

    /// The output path, whether or not it was written.
    pub fn output(&self) -> &PathBuf {
        match self {
            Self::NoInputs { output, .. }
            | Self::DryRun { output, .. }
            | Self::NothingMerged { output, .. }
            | Self::Written { output, .. } => output,
        }
    }

    /// Check whether an output file was produced.
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// A configured run over one directory.
pub struct Pipeline {
    config: Config,
    sink: Arc<dyn DiagnosticSink>,
    cache: Arc<TransformCache>,
    writer: PdfWriter,
}

impl Pipeline {
    /// Create a pipeline with its own transform cache.
    pub fn new(config: Config, sink: Arc<dyn DiagnosticSink>) -> Self {
        let cache = Arc::new(TransformCache::new(config.cache));
        Self {
            config,
            sink,
            cache,
            writer: PdfWriter::new(),
        }
    }

    /// Share an existing transform cache, e.g. across repeated runs.
    pub fn with_cache(mut self, cache: Arc<TransformCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use a specific writer.
    pub fn with_writer(mut self, writer: PdfWriter) -> Self {
        self.writer = writer;
        self
    }

    /// The transform cache used by this pipeline.
    pub fn cache(&self) -> &Arc<TransformCache> {
        &self.cache
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The directory cannot be read
    /// - The output would replace a different file
    /// - The output cannot be serialized or written
    /// - Strict mode is on and any input fails
    pub async fn run(&self) -> Result<RunOutcome> {
        self.config
            .validate()
            .map_err(|e| DirPdfError::invalid_config(e.to_string()))?;

        let directory = tokio::fs::canonicalize(&self.config.directory)
            .await
            .map_err(|e| DirPdfError::selection_failed(self.config.directory.clone(), e))?;
        let output = output_path_for(&directory)?;
        let title = directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut selector = FileSelector::new()?;
        if let Some(name) = output.file_name() {
            selector = selector.excluding(name);
        }
        let scan_dir = directory.clone();
        let entries = task::spawn_blocking(move || selector.select(&scan_dir))
            .await
            .map_err(|e| DirPdfError::other(format!("Task join error: {e}")))??;

        info!(
            directory = %directory.display(),
            inputs = entries.len(),
            "selected inputs"
        );

        if entries.is_empty() {
            self.sink.emit(
                MessageLevel::Info,
                &format!("No images or PDFs found in {}", directory.display()),
                &DiagnosticContext::none(),
            );
            return Ok(RunOutcome::NoInputs { directory, output });
        }

        self.writer.check_target(&output).await?;

        if self.config.dry_run {
            return Ok(RunOutcome::DryRun {
                directory,
                output,
                plan: entries,
            });
        }

        let merger = Merger::new(Arc::clone(&self.cache), Arc::clone(&self.sink));
        let result = merger
            .merge(&entries, &self.config, &DocumentInfo::new(title))
            .await?;

        let Some(document) = result.document else {
            self.sink.emit(
                MessageLevel::Warning,
                &format!(
                    "None of the {} input(s) could be merged; {} was not written",
                    entries.len(),
                    output.display()
                ),
                &DiagnosticContext::none(),
            );
            return Ok(RunOutcome::NothingMerged {
                directory,
                output,
                statistics: result.statistics,
                failures: result.failures,
            });
        };

        let write = self.writer.save(document, &output).await?;
        debug!(
            output = %output.display(),
            pages = result.statistics.total_pages,
            "run complete"
        );

        Ok(RunOutcome::Written {
            directory,
            output,
            statistics: result.statistics,
            failures: result.failures,
            write,
        })
    }
}

/// Merge a directory with `config`, discarding diagnostics.
///
/// Convenience wrapper around [`Pipeline`].
///
/// # Errors
///
/// See [`Pipeline::run`].
pub async fn merge_directory(config: Config) -> Result<RunOutcome> {
    Pipeline::new(config, Arc::new(NullSink)).run().await
}
