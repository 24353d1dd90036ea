//! Output formatting and reporting for dirpdf.
//!
//! This module handles all user-facing output:
//! - The [`DiagnosticSink`] seam the pipeline reports through
//! - Console formatting with quiet and verbose modes
//! - An in-memory sink for tests and embedders
//! - The machine-readable run report
//!
//! # Examples
//!
//! ```no_run
//! use dirpdf::output::OutputFormatter;
//! use dirpdf::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Scanning directory");
//! formatter.success("Merge completed successfully");
//! # }
//! ```

pub mod diagnostics;
pub mod formatter;
pub mod report;

pub use diagnostics::{Diagnostic, DiagnosticContext, DiagnosticSink, MemorySink, NullSink};
pub use formatter::{MessageLevel, OutputFormatter};
pub use report::{FailureReport, Outcome, PlannedItem, RunReport};

use crate::merge::MergeStatistics;

/// Display merge statistics to the user.
///
/// # Arguments
///
/// * `formatter` - Output formatter to use
/// * `stats` - Merge statistics to display
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    if stats.skipped > 0 {
        formatter.warning(&format!(
            "Warning: {} of {} file(s) skipped",
            stats.skipped, stats.items
        ));
    }

    formatter.info(&format!(
        "Merged {} file(s) in {:.2}s: {} pages, {}",
        stats.files_merged(),
        stats.merge_time.as_secs_f64(),
        stats.total_pages,
        stats.format_input_size()
    ));

    formatter.detail(
        "Transform cache",
        &format!("{} hit(s), {} miss(es)", stats.cache_hits, stats.cache_misses),
    );
}
