//! Directory merge orchestration.
//!
//! The merger walks the selected inputs in order and turns each one into
//! pages of a single output document:
//!
//! - an image is normalized (through the transform cache) and becomes one
//!   page exactly its scaled size,
//! - a PDF contributes all of its pages in their original order.
//!
//! Preparation (reading, decoding, parsing) runs concurrently, bounded by the
//! configured job count; results come back in selection order and are
//! appended one at a time. A failing input is reported and skipped unless
//! strict mode is on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use lopdf::Document;
use tokio::task::JoinError;
use tracing::debug;

use crate::cache::{CacheKey, TransformCache};
use crate::config::Config;
use crate::error::{DirPdfError, Result};
use crate::io::{LoadedDocument, SourceReader};
use crate::merge::builder::{DocumentBuilder, DocumentInfo};
use crate::output::{DiagnosticContext, DiagnosticSink, MessageLevel};
use crate::raster::{ImageNormalizer, NormalizeError, NormalizedImage, Scale};
use crate::select::{InputEntry, InputKind};

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default)]
pub struct MergeStatistics {
    /// Number of inputs considered.
    pub items: usize,

    /// Images that became pages.
    pub images_merged: usize,

    /// PDFs whose pages were copied.
    pub documents_merged: usize,

    /// Inputs skipped because of an error.
    pub skipped: usize,

    /// Total number of pages in merged document.
    pub total_pages: usize,

    /// Images served from the transform cache.
    pub cache_hits: usize,

    /// Images that had to be normalized.
    pub cache_misses: usize,

    /// Total size of the merged inputs.
    pub input_size: u64,

    /// Total time taken for merge.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Number of inputs that contributed pages.
    pub fn files_merged(&self) -> usize {
        self.images_merged + self.documents_merged
    }

    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// An input that was skipped.
#[derive(Debug)]
pub struct ItemFailure {
    /// Path of the input.
    pub path: PathBuf,
    /// Selection order of the input.
    pub order: usize,
    /// Kind of the input.
    pub kind: InputKind,
    /// Why it was skipped.
    pub error: DirPdfError,
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeResult {
    /// The merged document, or `None` when no input produced a page.
    pub document: Option<Document>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Inputs that were skipped, in selection order.
    pub failures: Vec<ItemFailure>,
}

enum Prepared {
    Image {
        image: NormalizedImage,
        file_size: u64,
    },
    Document(LoadedDocument),
}

/// Whether preparing an image consulted the cache, and with what result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheLookup {
    Hit,
    Miss,
    NotApplicable,
}

/// Merger that turns ordered inputs into one document.
pub struct Merger {
    /// Reader for image bytes and PDFs.
    reader: SourceReader,

    /// Cache of normalized images.
    cache: Arc<TransformCache>,

    /// Receiver of progress and failure diagnostics.
    sink: Arc<dyn DiagnosticSink>,
}

impl Merger {
    /// Create a merger using `cache` and reporting to `sink`.
    pub fn new(cache: Arc<TransformCache>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            reader: SourceReader::new(),
            cache,
            sink,
        }
    }

    /// Merge `entries` (already in page order) according to `config`.
    ///
    /// # Errors
    ///
    /// Per-item errors are recorded in [`MergeResult::failures`] and never
    /// returned, except in strict mode where the first one aborts the merge.
    /// Fatal errors are always returned.
    pub async fn merge(
        &self,
        entries: &[InputEntry],
        config: &Config,
        info: &DocumentInfo,
    ) -> Result<MergeResult> {
        let merge_start = Instant::now();
        let normalizer = ImageNormalizer::with_quality(config.jpeg_quality);
        let scale = config.scale;
        let total = entries.len();

        let mut builder = DocumentBuilder::new();
        let mut statistics = MergeStatistics {
            items: total,
            ..Default::default()
        };
        let mut failures = Vec::new();

        let prepared = stream::iter(entries)
            .map(|entry| {
                let normalizer = &normalizer;
                async move {
                    let (result, lookup) = self.prepare(entry, normalizer, scale).await;
                    (entry, result, lookup)
                }
            })
            .buffered(config.effective_jobs().max(1));
        let mut prepared = std::pin::pin!(prepared);

        while let Some((entry, result, lookup)) = prepared.next().await {
            match lookup {
                CacheLookup::Hit => statistics.cache_hits += 1,
                CacheLookup::Miss => statistics.cache_misses += 1,
                CacheLookup::NotApplicable => {}
            }

            let appended = result.and_then(|item| Self::append(&mut builder, entry, item));

            match appended {
                Ok((pages, file_size)) => {
                    match entry.kind {
                        InputKind::Image => statistics.images_merged += 1,
                        InputKind::Document => statistics.documents_merged += 1,
                    }
                    statistics.total_pages += pages;
                    statistics.input_size += file_size;

                    self.sink.emit(
                        MessageLevel::Debug,
                        &format!(
                            "[{}/{}] {} ({} page{})",
                            entry.order + 1,
                            total,
                            entry.file_name(),
                            pages,
                            if pages == 1 { "" } else { "s" }
                        ),
                        &DiagnosticContext::for_entry(entry),
                    );
                }
                Err(err) if err.is_recoverable() && !config.strict => {
                    debug!(path = %entry.path.display(), error = %err, "skipping input");
                    self.sink.emit(
                        MessageLevel::Warning,
                        &format!("Skipping {}", entry.file_name()),
                        &DiagnosticContext::for_entry(entry).with_cause(&err),
                    );
                    statistics.skipped += 1;
                    failures.push(ItemFailure {
                        path: entry.path.clone(),
                        order: entry.order,
                        kind: entry.kind,
                        error: err,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let document = if builder.is_empty() {
            None
        } else {
            let info = info.clone();
            let compression = config.compression;
            let document = tokio::task::spawn_blocking(move || builder.finish(&info, compression))
                .await
                .map_err(|e| DirPdfError::other(format!("Task join error: {e}")))?;
            Some(document)
        };

        statistics.merge_time = merge_start.elapsed();
        debug!(
            pages = statistics.total_pages,
            skipped = statistics.skipped,
            cache_hits = statistics.cache_hits,
            elapsed_ms = statistics.merge_time.as_millis() as u64,
            "merge finished"
        );

        Ok(MergeResult {
            document,
            statistics,
            failures,
        })
    }

    /// Read and decode one input without touching the output document.
    async fn prepare(
        &self,
        entry: &InputEntry,
        normalizer: &ImageNormalizer,
        scale: Scale,
    ) -> (Result<Prepared>, CacheLookup) {
        match entry.kind {
            InputKind::Document => (
                self.reader
                    .load_document(&entry.path)
                    .await
                    .map(Prepared::Document),
                CacheLookup::NotApplicable,
            ),
            InputKind::Image => self.prepare_image(entry, normalizer, scale).await,
        }
    }

    async fn prepare_image(
        &self,
        entry: &InputEntry,
        normalizer: &ImageNormalizer,
        scale: Scale,
    ) -> (Result<Prepared>, CacheLookup) {
        let fingerprint = match self.reader.fingerprint(&entry.path).await {
            Ok(fingerprint) => fingerprint,
            Err(err) => return (Err(err), CacheLookup::NotApplicable),
        };
        let file_size = fingerprint.len;
        let key = CacheKey::new(entry.path.clone(), fingerprint, scale);

        if let Some(image) = self.cache.get(&key) {
            debug!(path = %entry.path.display(), "transform cache hit");
            return (Ok(Prepared::Image { image, file_size }), CacheLookup::Hit);
        }
        debug!(path = %entry.path.display(), "transform cache miss");

        let result = self.normalize(entry, normalizer, scale).await.map(|image| {
            self.cache.put(key, image.clone());
            Prepared::Image { image, file_size }
        });
        (result, CacheLookup::Miss)
    }

    async fn normalize(
        &self,
        entry: &InputEntry,
        normalizer: &ImageNormalizer,
        scale: Scale,
    ) -> Result<NormalizedImage> {
        let bytes = self.reader.read_image(&entry.path).await?;
        let normalizer = normalizer.clone();

        tokio::task::spawn_blocking(move || normalizer.normalize(&bytes, scale))
            .await
            .map_err(|e| image_task_failed(&entry.path, e))?
            .map_err(|source| DirPdfError::image_failed(entry.path.clone(), source))
    }

    /// Append a prepared input, returning its page count and input size.
    fn append(
        builder: &mut DocumentBuilder,
        entry: &InputEntry,
        prepared: Prepared,
    ) -> Result<(usize, u64)> {
        match prepared {
            Prepared::Image { image, file_size } => {
                builder
                    .append_image_page(image)
                    .map_err(|e| DirPdfError::embed_failed(entry.path.clone(), e.to_string()))?;
                Ok((1, file_size))
            }
            Prepared::Document(loaded) => {
                let pages = builder.append_document(loaded.document);
                Ok((pages, loaded.file_size))
            }
        }
    }
}

/// A panicked decode fails only its own item.
fn image_task_failed(path: &Path, err: JoinError) -> DirPdfError {
    DirPdfError::image_failed(path.to_path_buf(), NormalizeError::Panicked(err.to_string()))
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
