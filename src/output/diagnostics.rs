//! Structured diagnostics.
//!
//! The merge pipeline never prints. It reports what happens through a
//! [`DiagnosticSink`] handed to it by the caller: the CLI passes an
//! [`OutputFormatter`](crate::output::OutputFormatter), tests and embedders
//! pass a [`MemorySink`] and inspect what was recorded.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::output::MessageLevel;
use crate::select::InputEntry;

/// Where a diagnostic came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticContext {
    /// Input the message is about, if any.
    pub path: Option<PathBuf>,
    /// Selection order of that input.
    pub order: Option<usize>,
    /// Underlying cause, for failures.
    pub cause: Option<String>,
}

impl DiagnosticContext {
    /// A context that is not tied to any input.
    pub fn none() -> Self {
        Self::default()
    }

    /// A context for one selected input.
    pub fn for_entry(entry: &InputEntry) -> Self {
        Self {
            path: Some(entry.path.clone()),
            order: Some(entry.order),
            cause: None,
        }
    }

    /// Attach a cause.
    pub fn with_cause(mut self, cause: impl ToString) -> Self {
        self.cause = Some(cause.to_string());
        self
    }
}

/// Receiver of user-facing diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record one message.
    fn emit(&self, level: MessageLevel, message: &str, context: &DiagnosticContext);
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub level: MessageLevel,
    /// Human-readable message.
    pub message: String,
    /// Input context.
    pub context: DiagnosticContext,
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded diagnostics at `level`.
    pub fn at_level(&self, level: MessageLevel) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.level == level)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, level: MessageLevel, message: &str, context: &DiagnosticContext) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic {
                level,
                message: message.to_string(),
                context: context.clone(),
            });
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _level: MessageLevel, _message: &str, _context: &DiagnosticContext) {}
}
